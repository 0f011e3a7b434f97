//! Minimal CSV reader for the published lake data files.
//!
//! The data files are produced by our own export pipeline: plain
//! comma-separated values, one header row, no quoting. Quoted fields with
//! embedded commas or newlines are NOT supported and will be split; that is
//! a known limitation of the format, not something to repair here.
//!
//! No type coercion happens at this layer. Every value stays text and the
//! typed readers in `ingest` parse numbers and dates explicitly.

use serde::ser::{Serialize, SerializeMap, Serializer};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One data row, keyed by header name in header order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsvRecord {
    fields: Vec<(String, String)>,
}

impl CsvRecord {
    /// Value for `column`, or `None` if the header has no such column.
    /// A short row still yields `Some("")` for its missing trailing fields.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for CsvRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A parsed CSV document: the (trimmed) header names and the data records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub records: Vec<CsvRecord>,
}

impl CsvTable {
    /// True when the input had no usable header (empty or whitespace-only
    /// text parses to a single empty column name).
    pub fn is_empty_header(&self) -> bool {
        self.header.iter().all(|h| h.is_empty())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|h| h == column)
    }
}

/// Parses CSV text using the first row as header.
///
/// - the whole text is trimmed, then split on `\n` / `\r\n`
/// - header names are trimmed, values are kept as-is
/// - missing trailing fields map to `""`, surplus fields are ignored
/// - a repeated header name keeps its first position and takes the value
///   of its last column
///
/// Empty input yields a header of one empty name and zero records.
pub fn parse_csv(text: &str) -> CsvTable {
    let mut lines = text.trim().split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

    // `split` always yields at least one item, even for "".
    let header_line = lines.next().unwrap_or_default();

    // (name, column index) in first-seen order; later duplicates win the index.
    let mut columns: Vec<(String, usize)> = Vec::new();
    for (i, raw) in header_line.split(',').enumerate() {
        let name = raw.trim().to_string();
        match columns.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = i,
            None => columns.push((name, i)),
        }
    }

    let records = lines
        .map(|line| {
            let cells: Vec<&str> = line.split(',').collect();
            let fields = columns
                .iter()
                .map(|(name, i)| (name.clone(), cells.get(*i).copied().unwrap_or("").to_string()))
                .collect();
            CsvRecord { fields }
        })
        .collect();

    CsvTable {
        header: columns.into_iter().map(|(n, _)| n).collect(),
        records,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_maps_header_to_values() {
        let table = parse_csv("a,b,c\n1,2,3");
        assert_eq!(table.header, vec!["a", "b", "c"]);
        assert_eq!(table.records.len(), 1);
        let rec = &table.records[0];
        assert_eq!(rec.get("a"), Some("1"));
        assert_eq!(rec.get("b"), Some("2"));
        assert_eq!(rec.get("c"), Some("3"));
    }

    #[test]
    fn test_short_row_pads_missing_trailing_fields_with_empty_string() {
        let table = parse_csv("a,b,c\n1");
        let rec = &table.records[0];
        assert_eq!(rec.get("a"), Some("1"));
        assert_eq!(rec.get("b"), Some(""));
        assert_eq!(rec.get("c"), Some(""));
    }

    #[test]
    fn test_surplus_fields_are_ignored() {
        let table = parse_csv("a,b\n1,2,3,4\n5,6,7");
        assert_eq!(table.records.len(), 2);
        let rec = &table.records[0];
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("a"), Some("1"));
        assert_eq!(rec.get("b"), Some("2"));
        assert_eq!(table.records[1].get("b"), Some("6"));
    }

    #[test]
    fn test_repeated_header_keeps_first_position_and_last_value() {
        let table = parse_csv("a,b,a\n1,2,3,4");
        assert_eq!(table.header, vec!["a", "b"]);
        let rec = &table.records[0];
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("a"), Some("3"));
        assert_eq!(rec.get("b"), Some("2"));
        let keys: Vec<_> = rec.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_column_is_none() {
        let table = parse_csv("a\n1");
        assert_eq!(table.records[0].get("zzz"), None);
    }

    #[test]
    fn test_record_keeps_header_order() {
        let table = parse_csv("dt64,lic,sensor\n2020-01-01,55.5,Sentinel-1");
        let keys: Vec<_> = table.records[0].iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["dt64", "lic", "sensor"]);
    }

    #[test]
    fn test_crlf_line_endings_and_surrounding_whitespace() {
        let table = parse_csv("\n a , b \r\n1,2\r\n3,4\r\n\n");
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1].get("b"), Some("4"));
    }

    #[test]
    fn test_values_are_not_coerced_or_trimmed() {
        let table = parse_csv("x,y\n 007, 1e3");
        assert_eq!(table.records[0].get("x"), Some(" 007"));
        assert_eq!(table.records[0].get("y"), Some(" 1e3"));
    }

    #[test]
    fn test_empty_input_yields_empty_header_and_no_rows() {
        let table = parse_csv("   \n  ");
        assert!(table.records.is_empty());
        assert!(table.is_empty_header());
    }

    #[test]
    fn test_header_only_has_zero_rows() {
        let table = parse_csv("lip_year,FUS,FUE\n");
        assert!(!table.is_empty_header());
        assert!(table.records.is_empty());
        assert!(table.has_column("FUS"));
    }

    #[test]
    fn test_embedded_comma_is_split_not_unescaped() {
        // Quoting is not supported: the quoted comma is treated as a delimiter.
        let table = parse_csv("name,n\n\"Lac, Grand\",1");
        assert_eq!(table.records[0].get("name"), Some("\"Lac"));
        assert_eq!(table.records[0].get("n"), Some(" Grand\""));
    }

    #[test]
    fn test_record_serializes_as_ordered_object() {
        let table = parse_csv("a,b,c\n1,2,3");
        let json = serde_json::to_string(&table.records).unwrap();
        assert_eq!(json, r#"[{"a":"1","b":"2","c":"3"}]"#);
    }
}
