// src/transform/types.rs

use serde::{ser::SerializeMap, Serialize, Serializer};

/// One input row: `(column, value)` pairs in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    cells: Vec<(String, String)>,
}

impl FlatRecord {
    /// Pair a header row with one CSV record. Columns past the end of a short
    /// record are left out, which reads the same as an empty cell.
    pub fn from_csv(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect()
    }

    /// Value of the first cell named `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlatRecord {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A single owner extracted from the `(N)`-indexed column families of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proprietor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companies_house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address3: Option<String>,
}

impl Proprietor {
    pub fn named(name: impl Into<String>) -> Self {
        Proprietor {
            name: name.into(),
            category: None,
            companies_house_number: None,
            address1: None,
            address2: None,
            address3: None,
        }
    }
}

/// Output row: plain columns carried through, plus the grouped proprietors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedRecord {
    /// Non-indexed, non-empty columns in source order.
    pub fields: Vec<(String, String)>,
    pub proprietors: Vec<Proprietor>,
}

impl ProcessedRecord {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }
}

impl Serialize for ProcessedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_proprietors = !self.proprietors.is_empty();
        let plain = || {
            self.fields
                .iter()
                .filter(move |(c, _)| !(has_proprietors && c == "proprietors"))
        };

        let len = plain().count() + usize::from(has_proprietors);
        let mut map = serializer.serialize_map(Some(len))?;
        for (column, value) in plain() {
            map.serialize_entry(column, value)?;
        }
        if has_proprietors {
            map.serialize_entry("proprietors", &self.proprietors)?;
        }
        map.end()
    }
}
