/// Deep links: `?lake_id=<id>#<tab>`.
///
/// Selecting a lake writes its id into the query; closing the panel drops
/// the query entirely. The fragment names the active page tab and is left
/// off on the map page.

use url::{Url, form_urlencoded};

use crate::model::DataError;

/// Query parameter carrying the selected lake.
pub const LAKE_ID_PARAM: &str = "lake_id";

/// Page tab that shows the map and lake panel.
pub const MAP_TAB: &str = "map";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeepLink {
    pub lake_id: Option<String>,
    pub tab: Option<String>,
}

impl DeepLink {
    pub fn for_lake(lake_id: &str) -> Self {
        Self {
            lake_id: Some(lake_id.to_string()),
            tab: None,
        }
    }

    /// Parses an absolute URL or a relative location such as
    /// `/?lake_id=UKL00001#map`. A blank `lake_id` counts as absent.
    pub fn parse(location: &str) -> Result<Self, DataError> {
        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")
                .and_then(|base| base.join(location))
                .map_err(|e| DataError::ParseError(format!("Invalid location {location}: {e}")))?,
            Err(e) => {
                return Err(DataError::ParseError(format!(
                    "Invalid location {location}: {e}"
                )));
            }
        };

        let lake_id = url
            .query_pairs()
            .find(|(k, _)| k == LAKE_ID_PARAM)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let tab = url
            .fragment()
            .map(str::to_string)
            .filter(|t| !t.is_empty());

        Ok(Self { lake_id, tab })
    }

    /// The query string, `?lake_id=...`, or empty when no lake is selected.
    pub fn to_query(&self) -> String {
        match &self.lake_id {
            Some(id) => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .append_pair(LAKE_ID_PARAM, id)
                    .finish();
                format!("?{encoded}")
            }
            None => String::new(),
        }
    }

    /// Query plus fragment, as written to the address bar.
    pub fn to_location(&self) -> String {
        match &self.tab {
            Some(tab) => format!("{}#{}", self.to_query(), tab),
            None => self.to_query(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lake_id.is_none() && self.tab.is_none()
    }
}
