/// Data sources for the published lake files.
///
/// The lake data is a set of static files: per-lake CSVs, a lookup table and
/// a GeoJSON layer. They are normally served over HTTP, but the same tree can
/// be mirrored to a local directory (for offline work and tests), so fetching
/// goes through the `DataSource` trait rather than a concrete client.
///
/// Fetches are best-effort: one attempt, no retries.

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::config::DataConfig;
use crate::model::DataError;

// ============================================================================
// Trait
// ============================================================================

/// Something that can return the text of a resource addressed by a
/// data-root-relative path such as `/data/timeseries/123.csv`.
pub trait DataSource: Send + Sync {
    fn fetch_text(&self, path: &str) -> Result<String, DataError>;

    /// Human-readable location of `path`, for logs and reports.
    fn locate(&self, path: &str) -> String;
}

/// Builds the configured source: the local directory if one is set,
/// otherwise the HTTP host.
pub fn from_config(config: &DataConfig) -> Result<Box<dyn DataSource>, DataError> {
    match &config.data_dir {
        Some(dir) => Ok(Box::new(DirSource::new(dir))),
        None => Ok(Box::new(HttpSource::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?)),
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches resources from a static web host.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::RequestFailed {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::blocking::Client, base_url: &str) -> Result<Self, DataError> {
        Ok(Self {
            client,
            base: parse_base_url(base_url)?,
        })
    }

    /// Resolves a data path against the base URL.
    ///
    /// Paths are treated as relative to the base even when they start with
    /// `/`, so a site deployed under a sub-path keeps working.
    pub fn url_for(&self, path: &str) -> Result<Url, DataError> {
        self.base
            .join(relative_data_path(path)?)
            .map_err(|e| DataError::ParseError(format!("invalid data path '{}': {}", path, e)))
    }
}

/// Strips the leading `/` from a data path and refuses anything that could
/// leave the data root once joined: `..` components, and `?` or `#`, which
/// a URL would read as query or fragment. Lake ids end up in these paths
/// and may come from a deep link.
pub fn relative_data_path(path: &str) -> Result<&str, DataError> {
    let relative = path.trim_start_matches('/');
    let escapes = relative
        .split(['/', '\\'])
        .any(|part| part == ".." || part.eq_ignore_ascii_case("%2e%2e"));
    if escapes || relative.contains(['?', '#']) {
        return Err(DataError::ParseError(format!("invalid data path '{}'", path)));
    }
    Ok(relative)
}

/// Parses a base URL, forcing a trailing slash so joins append to it.
pub fn parse_base_url(base_url: &str) -> Result<Url, DataError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };
    Url::parse(&normalized)
        .map_err(|e| DataError::ParseError(format!("invalid base URL '{}': {}", base_url, e)))
}

impl DataSource for HttpSource {
    fn fetch_text(&self, path: &str) -> Result<String, DataError> {
        let url = self.url_for(path)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| DataError::RequestFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DataError::HttpError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(|e| DataError::RequestFailed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn locate(&self, path: &str) -> String {
        self.url_for(path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| path.to_string())
    }
}

// ============================================================================
// Local directory
// ============================================================================

/// Reads resources from a local mirror of the data tree.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Maps a data path onto the directory. Parent components are refused
    /// so a lake id cannot escape the data root.
    pub fn path_for(&self, path: &str) -> Result<PathBuf, DataError> {
        Ok(self.root.join(relative_data_path(path)?))
    }
}

impl DataSource for DirSource {
    fn fetch_text(&self, path: &str) -> Result<String, DataError> {
        let file = self.path_for(path)?;
        std::fs::read_to_string(&file).map_err(|e| DataError::Io {
            path: file.display().to_string(),
            kind: e.kind(),
            message: e.to_string(),
        })
    }

    fn locate(&self, path: &str) -> String {
        self.path_for(path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_without_trailing_slash_keeps_sub_path() {
        let source = HttpSource::with_client(
            reqwest::blocking::Client::new(),
            "https://lakes.example.org/alps",
        )
        .unwrap();
        let url = source.url_for("/data/timeseries/42.csv").unwrap();
        assert_eq!(url.as_str(), "https://lakes.example.org/alps/data/timeseries/42.csv");
    }

    #[test]
    fn test_url_for_refuses_ids_that_escape_the_data_root() {
        let source = HttpSource::with_client(
            reqwest::blocking::Client::new(),
            "https://h.example/alps/",
        )
        .unwrap();
        let paths = crate::config::DataPaths::default();
        for lake_id in ["../../secret", "x#frag", "a?b=1", "..\\..\\secret", "%2E%2E/x"] {
            let path = paths.timeseries_for(lake_id);
            let err = source.url_for(&path).unwrap_err();
            assert!(matches!(err, DataError::ParseError(_)), "{} was accepted", lake_id);
        }
        let ok = source.url_for(&paths.timeseries_for("UKL00001")).unwrap();
        assert_eq!(ok.as_str(), "https://h.example/alps/data/timeseries/UKL00001.csv");
    }

    #[test]
    fn test_invalid_base_url_is_parse_error() {
        let err = parse_base_url("not a url").unwrap_err();
        assert!(matches!(err, DataError::ParseError(_)));
    }

    #[test]
    fn test_dir_source_reads_files_below_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data/phenology")).unwrap();
        std::fs::write(dir.path().join("data/phenology/7.csv"), "lip_year\n2020\n").unwrap();

        let source = DirSource::new(dir.path());
        let text = source.fetch_text("/data/phenology/7.csv").unwrap();
        assert_eq!(text, "lip_year\n2020\n");
    }

    #[test]
    fn test_dir_source_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let err = source.fetch_text("/data/timeseries/missing.csv").unwrap_err();
        assert!(matches!(
            err,
            DataError::Io {
                kind: std::io::ErrorKind::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_dir_source_refuses_parent_components() {
        let source = DirSource::new("/srv/lakes");
        assert!(source.path_for("/data/timeseries/../../etc/passwd").is_err());
    }
}
