/// Lake registry: the search lookup table and per-lake metadata.
///
/// Two published files describe the lakes:
///   - the lookup table (`euhydro_lut.json`): a JSON array of
///     `{NAM_OSM, OBJECT_ID}` used for name search,
///   - the lake layer (`euhydro.geojson`): a FeatureCollection whose
///     feature properties carry the EU-Hydro metadata shown in the panel.
///
/// `OBJECT_ID` is the lake identifier everywhere else in the service
/// (data file names, deep links).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::DataPaths;
use crate::ingest::{DataSource, fetch_json};
use crate::model::DataError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Reads an identifier that may be published as a string or a number.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_text(&value).ok_or_else(|| serde::de::Error::custom("OBJECT_ID must be a string or number"))
}

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

/// Folds a lake name for accent-insensitive matching.
///
/// Lowercases, spells out German special letters (`ß`→`ss`, `ä`→`ae`,
/// `ö`→`oe`, `ü`→`ue`), then strips the remaining Latin diacritics
/// (`é`→`e`, `č`→`c`, ...). Letters without a decomposition (`ø`, `ł`,
/// `æ`) are left alone.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        match c {
            'ß' => out.push_str("ss"),
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            _ => out.push(strip_diacritic(c)),
        }
    }
    out
}

fn strip_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => 'c',
        'ď' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' => 'l',
        'ñ' | 'ń' | 'ň' | 'ņ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ō' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Lookup table
// ---------------------------------------------------------------------------

/// One entry of the search lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupEntry {
    #[serde(rename = "NAM_OSM", default)]
    pub name: String,
    #[serde(rename = "OBJECT_ID", deserialize_with = "deserialize_id")]
    pub object_id: String,
}

impl LookupEntry {
    /// Search list label, e.g. `Lago Maggiore (UKL00001)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.object_id)
    }
}

/// The lake name lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LakeLookup {
    pub entries: Vec<LookupEntry>,
}

impl LakeLookup {
    pub fn from_json(text: &str) -> Result<Self, DataError> {
        let entries: Vec<LookupEntry> = serde_json::from_str(text)?;
        Ok(Self { entries })
    }

    pub fn fetch(source: &dyn DataSource, paths: &DataPaths) -> Result<Self, DataError> {
        let entries: Vec<LookupEntry> = fetch_json(source, &paths.lookup)?;
        Ok(Self { entries })
    }

    /// Entries whose label contains `query`, ignoring case and accents,
    /// in table order. A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&LookupEntry> {
        let needle = normalize_name(query.trim());
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| normalize_name(&e.label()).contains(&needle))
            .collect()
    }

    pub fn find(&self, object_id: &str) -> Option<&LookupEntry> {
        self.entries.iter().find(|e| e.object_id == object_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extracts the lake id from a search label: the text inside the final
/// parentheses, e.g. `"Lac d'Annecy (FR123)"` → `"FR123"`.
pub fn parse_search_label(label: &str) -> Option<&str> {
    let inner = label.trim_end().strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let id = &inner[open + 1..];
    if id.is_empty() || id.contains(')') {
        return None;
    }
    Some(id)
}

// ---------------------------------------------------------------------------
// Lake metadata
// ---------------------------------------------------------------------------

/// EU-Hydro metadata of one lake, from a GeoJSON feature's properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LakeMeta {
    pub object_id: Option<String>,
    /// Lake name (`NAM`).
    pub name: Option<String>,
    /// Country code (`REX`).
    pub country: Option<String>,
    /// Surface area in m² (`AREA_GEO`).
    pub area_m2: Option<f64>,
    /// Altitude in m a.s.l. (`ALTITUDE`).
    pub altitude_m: Option<f64>,
    /// `N` natural, `R` reservoir, `U` unknown (`LKE_TYPE`).
    pub lake_type: Option<String>,
}

fn prop_text(props: &Value, key: &str) -> Option<String> {
    props.get(key).and_then(id_text)
}

fn prop_number(props: &Value, key: &str) -> Option<f64> {
    let value = match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

impl LakeMeta {
    /// Reads metadata from a feature's `properties` object.
    pub fn from_properties(props: &Value) -> Self {
        Self {
            object_id: prop_text(props, "OBJECT_ID"),
            name: prop_text(props, "NAM"),
            country: prop_text(props, "REX"),
            area_m2: prop_number(props, "AREA_GEO"),
            altitude_m: prop_number(props, "ALTITUDE"),
            lake_type: prop_text(props, "LKE_TYPE"),
        }
    }

    /// Reads metadata from a GeoJSON feature. `None` without `properties`.
    pub fn from_feature(feature: &Value) -> Option<Self> {
        feature
            .get("properties")
            .filter(|p| p.is_object())
            .map(Self::from_properties)
    }

    /// Panel title: the name, else the id, else `-`.
    pub fn title(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.object_id.clone())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn lake_type_label(&self) -> &'static str {
        match self.lake_type.as_deref() {
            Some("N") => "Natural",
            Some("R") => "Reservoir",
            Some("U") => "Unknown",
            _ => "-",
        }
    }

    /// Label/value pairs for the metadata cards, in display order. A zero
    /// area or altitude is a placeholder in the layer and shows as `-`.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        vec![
            ("Lake Name", or_dash(&self.name)),
            ("Country", or_dash(&self.country)),
            ("Lake Identifier (EU-Hydro)", or_dash(&self.object_id)),
            (
                "Area (km²)",
                self.area_m2
                    .filter(|a| *a != 0.0)
                    .map(|a| format!("{:.1}", a / 1e6))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Altitude (m a.s.l.)",
                self.altitude_m
                    .filter(|a| *a != 0.0)
                    .map(|a| format!("{:.1}", a))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Lake Type", self.lake_type_label().to_string()),
        ]
    }
}

/// All lakes of the published lake layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LakeCatalog {
    pub lakes: Vec<LakeMeta>,
}

impl LakeCatalog {
    /// Parses a GeoJSON FeatureCollection. Features without `properties`
    /// are skipped; geometry is ignored.
    pub fn from_geojson(text: &str) -> Result<Self, DataError> {
        let geo: Value = serde_json::from_str(text)?;
        let features = geo
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| DataError::ParseError("GeoJSON has no 'features' array".to_string()))?;

        let lakes = features
            .iter()
            .filter_map(LakeMeta::from_feature)
            .collect();

        Ok(Self { lakes })
    }

    pub fn fetch(source: &dyn DataSource, paths: &DataPaths) -> Result<Self, DataError> {
        let text = source.fetch_text(&paths.lakes)?;
        Self::from_geojson(&text)
    }

    /// Looks up a lake by `OBJECT_ID`. Returns `None` if not found.
    pub fn find(&self, object_id: &str) -> Option<&LakeMeta> {
        self.lakes
            .iter()
            .find(|l| l.object_id.as_deref() == Some(object_id))
    }

    pub fn len(&self) -> usize {
        self.lakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lakes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
