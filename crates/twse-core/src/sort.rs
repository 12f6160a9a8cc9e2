//! Sort directives and the sort engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TwseError;
use crate::types::AggregateRecord;

/// Ordering applied to an aggregate list.
///
/// Codes compare byte-wise as strings, not as numbers, so `"10"` sorts before `"9"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Ascending by security code.
    CodeAscending,
    /// Descending by security code.
    CodeDescending,
}

impl SortKey {
    /// Every supported directive.
    pub const ALL: [Self; 2] = [Self::CodeAscending, Self::CodeDescending];

    /// Canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CodeAscending => "CodeAscending",
            Self::CodeDescending => "CodeDescending",
        }
    }

    /// Label shown in the sort menu.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CodeAscending => "依股票代號升序",
            Self::CodeDescending => "依股票代號降序",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = TwseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CodeAscending" | "CodeAsc" | "CODE_ASC" => Ok(Self::CodeAscending),
            "CodeDescending" | "CodeDesc" | "CODE_DESC" => Ok(Self::CodeDescending),
            other => Err(TwseError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Reorders `records` in place. The sort is stable: entries with equal codes
/// keep their relative order.
pub fn sort_records(records: &mut [AggregateRecord], key: SortKey) {
    match key {
        SortKey::CodeAscending => {
            records.sort_by(|a, b| a.code().as_str().cmp(b.code().as_str()));
        }
        SortKey::CodeDescending => {
            records.sort_by(|a, b| b.code().as_str().cmp(a.code().as_str()));
        }
    }
}

/// Returns `records` reordered by `key`.
#[must_use]
pub fn sorted(mut records: Vec<AggregateRecord>, key: SortKey) -> Vec<AggregateRecord> {
    sort_records(&mut records, key);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StockCode, ValuationRecord};
    use proptest::prelude::*;

    fn entry(code: &str, name: &str) -> AggregateRecord {
        AggregateRecord {
            valuation: ValuationRecord::new(StockCode::new(code).unwrap(), name, "1.00"),
            average: None,
            detail: None,
        }
    }

    fn codes(records: &[AggregateRecord]) -> Vec<&str> {
        records.iter().map(|r| r.code().as_str()).collect()
    }

    #[test]
    fn test_descending() {
        let out = sorted(vec![entry("A", "a"), entry("B", "b")], SortKey::CodeDescending);
        assert_eq!(codes(&out), vec!["B", "A"]);
    }

    #[test]
    fn test_lexicographic_not_numeric() {
        let out = sorted(
            vec![entry("9", ""), entry("10", ""), entry("0050", "")],
            SortKey::CodeAscending,
        );
        assert_eq!(codes(&out), vec!["0050", "10", "9"]);
    }

    #[test]
    fn test_byte_order_puts_uppercase_first() {
        let out = sorted(vec![entry("a", ""), entry("B", "")], SortKey::CodeAscending);
        assert_eq!(codes(&out), vec!["B", "a"]);
    }

    #[test]
    fn test_stable_on_equal_codes() {
        let input = vec![entry("2", "first"), entry("1", ""), entry("2", "second")];

        let asc = sorted(input.clone(), SortKey::CodeAscending);
        let names: Vec<_> = asc.iter().map(|r| r.valuation.name.as_str()).collect();
        assert_eq!(names, vec!["", "first", "second"]);

        let desc = sorted(input, SortKey::CodeDescending);
        let names: Vec<_> = desc.iter().map(|r| r.valuation.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", ""]);
    }

    #[test]
    fn test_empty_list() {
        assert!(sorted(Vec::new(), SortKey::CodeAscending).is_empty());
    }

    #[test]
    fn test_parse_directives() {
        assert_eq!("CodeAscending".parse::<SortKey>().unwrap(), SortKey::CodeAscending);
        assert_eq!("CODE_DESC".parse::<SortKey>().unwrap(), SortKey::CodeDescending);
        assert_eq!("CodeAsc".parse::<SortKey>().unwrap(), SortKey::CodeAscending);
        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_directive_is_an_error() {
        let err = "PriceAscending".parse::<SortKey>().unwrap_err();
        assert!(matches!(err, TwseError::UnknownSortKey(ref s) if s == "PriceAscending"));
        assert!("codeascending".parse::<SortKey>().is_err());
    }

    proptest! {
        #[test]
        fn prop_descending_reverses_ascending(
            set in prop::collection::hash_set("[0-9A-Za-z]{1,5}", 0..32)
        ) {
            let input: Vec<_> = set.iter().map(|c| entry(c, "")).collect();
            let asc = sorted(input.clone(), SortKey::CodeAscending);
            let mut desc = sorted(asc.clone(), SortKey::CodeDescending);
            desc.reverse();
            prop_assert_eq!(asc, desc);
        }

        #[test]
        fn prop_sort_is_stable(raw in prop::collection::vec("[0-3]", 0..32)) {
            let input: Vec<_> = raw
                .iter()
                .enumerate()
                .map(|(i, c)| entry(c, &i.to_string()))
                .collect();
            let out = sorted(input, SortKey::CodeAscending);
            for pair in out.windows(2) {
                if pair[0].code() == pair[1].code() {
                    let a: usize = pair[0].valuation.name.parse().unwrap();
                    let b: usize = pair[1].valuation.name.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
