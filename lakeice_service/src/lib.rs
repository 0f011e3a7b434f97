/// Alpine lake ice data service.
///
/// Loads the published per-lake ice cover and ice phenology files, shapes
/// them into chart-ready structures, and coordinates which lake panel is
/// current so that late responses never overwrite a newer selection.

pub mod analysis;
pub mod config;
pub mod csv;
pub mod ingest;
pub mod lakes;
pub mod logging;
pub mod model;
pub mod panel;
pub mod route;
pub mod theme;
pub mod verify;
