use std::path::PathBuf;
use std::process::ExitCode;

use lakeice_service::config::{Config, DEFAULT_CONFIG_PATH};
use lakeice_service::ingest::source;
use lakeice_service::lakes::{LakeCatalog, LakeLookup, parse_search_label};
use lakeice_service::logging::{self, DataSource};
use lakeice_service::panel::load_lake;
use lakeice_service::verify::{print_summary, run_verification};

const USAGE: &str = "\
Usage: lakeice_service [--config PATH] [--verify] [--search QUERY] <lake_id>...

  --config PATH    configuration file (default ./lakeice.toml)
  --verify         check which lakes in the lookup table have data
  --search QUERY   list lakes whose name or id matches QUERY
  <lake_id>        print the chart payload of each lake as JSON;
                   a search label such as \"Bodensee (UKL00001)\" also works";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    verify: bool,
    search: Option<String>,
    lake_ids: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--verify" => parsed.verify = true,
            "--search" => {
                let query = args.next().ok_or("--search needs a query")?;
                parsed.search = Some(query);
            }
            "-h" | "--help" => return Err(String::new()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ => {
                let id = parse_search_label(&arg).unwrap_or(arg.as_str()).to_string();
                parsed.lake_ids.push(id);
            }
        }
    }
    if !parsed.verify && parsed.search.is_none() && parsed.lake_ids.is_empty() {
        return Err("nothing to do".to_string());
    }
    Ok(parsed)
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
            }
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logger(
        config.logging.min_level(),
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let source = match source::from_config(&config.data) {
        Ok(source) => source,
        Err(e) => {
            logging::error(DataSource::System, None, &format!("Cannot open data source: {e}"));
            return ExitCode::FAILURE;
        }
    };
    logging::info(
        DataSource::System,
        None,
        &format!("Reading lake data from {}", source.locate("/")),
    );
    let paths = &config.data.paths;

    if args.verify || args.search.is_some() {
        let lookup = match LakeLookup::fetch(source.as_ref(), paths) {
            Ok(lookup) => lookup,
            Err(e) => {
                logging::log_fetch_failure(DataSource::Lookup, None, "load lookup table", &e);
                return ExitCode::FAILURE;
            }
        };

        if let Some(query) = &args.search {
            for entry in lookup.search(query) {
                println!("{}", entry.label());
            }
        }

        if args.verify {
            let report = run_verification(source.as_ref(), paths, &lookup);
            print_summary(&report);
        }
    }

    if args.lake_ids.is_empty() {
        return ExitCode::SUCCESS;
    }

    // Metadata is optional: without it the payload still carries both charts.
    let catalog = match LakeCatalog::fetch(source.as_ref(), paths) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            logging::log_fetch_failure(DataSource::Lakes, None, "load lake layer", &e);
            None
        }
    };

    for lake_id in &args.lake_ids {
        let payload = load_lake(source.as_ref(), paths, catalog.as_ref(), lake_id);
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                logging::error(
                    DataSource::Panel,
                    Some(lake_id),
                    &format!("Failed to serialize payload: {e}"),
                );
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_lake_ids_and_labels() {
        let parsed = args(&["UKL00001", "Bodensee (UKL00002)"]).unwrap();
        assert_eq!(parsed.lake_ids, vec!["UKL00001", "UKL00002"]);
        assert!(!parsed.verify);
    }

    #[test]
    fn test_parse_flags() {
        let parsed = args(&["--config", "x.toml", "--verify", "--search", "see"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("x.toml")));
        assert!(parsed.verify);
        assert_eq!(parsed.search.as_deref(), Some("see"));
    }

    #[test]
    fn test_parse_rejects_missing_values_and_unknown_flags() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--bogus", "A"]).is_err());
        assert!(args(&[]).is_err());
    }
}
