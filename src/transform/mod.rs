// src/transform/mod.rs
//! Row transformer: turns one flat CSV row into a nested record by grouping
//! the `(N)`-indexed proprietor columns into a list.

pub mod columns;
pub mod types;

pub use columns::{classify, ColumnKind, Family};
pub use types::{FlatRecord, ProcessedRecord, Proprietor};

use std::collections::HashMap;
use tracing::trace;

/// Partially populated proprietor fields for one index within a row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProprietorParts {
    pub name: Option<String>,
    pub category: Option<String>,
    pub companies_house_number: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
}

impl ProprietorParts {
    fn slot(&mut self, family: Family) -> &mut Option<String> {
        match family {
            Family::Name => &mut self.name,
            Family::Category => &mut self.category,
            Family::Registration => &mut self.companies_house_number,
            Family::Address1 => &mut self.address1,
            Family::Address2 => &mut self.address2,
            Family::Address3 => &mut self.address3,
        }
    }

    /// `None` when no name was ever seen for this index.
    fn into_proprietor(self) -> Option<Proprietor> {
        Some(Proprietor {
            name: self.name?,
            category: self.category,
            companies_house_number: self.companies_house_number,
            address1: self.address1,
            address2: self.address2,
            address3: self.address3,
        })
    }
}

/// Result of the single classification pass over a row.
#[derive(Debug, Clone, Default)]
pub struct ParsedRow {
    pub plain: Vec<(String, String)>,
    pub parts: HashMap<String, ProprietorParts>,
    /// Indices in the order their name column was first seen.
    pub name_order: Vec<String>,
}

impl ParsedRow {
    /// Assemble the output record. Indices that never received a name are
    /// dropped together with whatever else was collected for them.
    pub fn into_record(mut self) -> ProcessedRecord {
        let mut proprietors = Vec::with_capacity(self.name_order.len());
        for index in &self.name_order {
            if let Some(p) = self
                .parts
                .remove(index)
                .and_then(ProprietorParts::into_proprietor)
            {
                proprietors.push(p);
            }
        }
        for index in self.parts.keys() {
            trace!(index = %index, "dropping proprietor fields without a name");
        }

        ProcessedRecord {
            fields: self.plain,
            proprietors,
        }
    }
}

/// Split a row into plain fields and per-index proprietor parts. Empty cells
/// are skipped entirely.
pub fn parse_row(row: &FlatRecord) -> ParsedRow {
    let mut parsed = ParsedRow::default();

    for (column, value) in row.iter() {
        if value.is_empty() {
            continue;
        }
        match classify(column) {
            ColumnKind::Plain => parsed.plain.push((column.to_string(), value.to_string())),
            ColumnKind::Indexed { family, index } => {
                trace!(column, family = family.as_str(), index, "indexed column");
                if family == Family::Name && !parsed.name_order.iter().any(|i| i == index) {
                    parsed.name_order.push(index.to_string());
                }
                *parsed
                    .parts
                    .entry(index.to_string())
                    .or_default()
                    .slot(family) = Some(value.to_string());
            }
        }
    }

    parsed
}

/// Transform one flat row into its nested form.
pub fn transform(row: &FlatRecord) -> ProcessedRecord {
    parse_row(row).into_record()
}
