// src/transform/columns.rs

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// The six `(N)`-indexed column families that describe a proprietor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Name,
    Category,
    Registration,
    Address1,
    Address2,
    Address3,
}

impl Family {
    pub const ALL: [Family; 6] = [
        Family::Name,
        Family::Category,
        Family::Registration,
        Family::Address1,
        Family::Address2,
        Family::Address3,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Family::Name => "name",
            Family::Category => "category",
            Family::Registration => "companiesHouseNumber",
            Family::Address1 => "address1",
            Family::Address2 => "address2",
            Family::Address3 => "address3",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Family::Name => r"^Proprietor Name \(([0-9]+)\)$",
            Family::Category => r"^Proprietorship Category \(([0-9]+)\)$",
            Family::Registration => r"^Company Registration No\. \(([0-9]+)\)$",
            Family::Address1 => r"^Proprietor \(([0-9]+)\) Address \(1\)$",
            Family::Address2 => r"^Proprietor \(([0-9]+)\) Address \(2\)$",
            Family::Address3 => r"^Proprietor \(([0-9]+)\) Address \(3\)$",
        }
    }
}

static PATTERNS: Lazy<Vec<(Family, Regex)>> = Lazy::new(|| {
    Family::ALL
        .iter()
        .map(|family| {
            let re = RegexBuilder::new(family.pattern())
                .case_insensitive(true)
                .build()
                .expect("column patterns are valid");
            (*family, re)
        })
        .collect()
});

/// What a column header turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind<'a> {
    Plain,
    Indexed { family: Family, index: &'a str },
}

/// Classify a header against the families in `Family::ALL` order; first match wins.
pub fn classify(column: &str) -> ColumnKind<'_> {
    for (family, re) in PATTERNS.iter() {
        if let Some(index) = re.captures(column).and_then(|c| c.get(1)) {
            return ColumnKind::Indexed {
                family: *family,
                index: index.as_str(),
            };
        }
    }
    ColumnKind::Plain
}
