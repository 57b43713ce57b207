//! Sort-key parsing for list endpoints.
//!
//! A sort parameter names a field, with a leading `-` selecting descending
//! order (`sort=label` ascending, `sort=-label` descending).

use serde::{Deserialize, Serialize};

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A parsed sort key: field name plus direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// The field to sort by.
    pub field: String,
    /// The direction to sort in.
    pub direction: SortDirection,
}

impl SortKey {
    /// Parses a raw sort parameter. A leading `-` marks descending order.
    ///
    /// Returns `None` for an empty parameter (including a bare `-`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, direction) = match raw.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (raw, SortDirection::Asc),
        };

        if field.is_empty() {
            return None;
        }

        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("label", "label", SortDirection::Asc)]
    #[case("-label", "label", SortDirection::Desc)]
    #[case("txid", "txid", SortDirection::Asc)]
    fn test_parse(#[case] raw: &str, #[case] field: &str, #[case] direction: SortDirection) {
        let key = SortKey::parse(raw).unwrap();
        assert_eq!(key.field, field);
        assert_eq!(key.direction, direction);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(SortKey::parse(""), None);
        assert_eq!(SortKey::parse("-"), None);
    }

    #[test]
    fn test_negation_reverses_direction() {
        let asc = SortKey::parse("label").unwrap();
        let desc = SortKey::parse("-label").unwrap();
        assert_eq!(asc.direction.reversed(), desc.direction);
        assert_eq!(desc.direction.reversed(), asc.direction);
    }
}
