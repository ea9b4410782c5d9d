//! `"<integer> <unit>"` interval specs used by interval arithmetic and refresh policies.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DialectError, Result};

static INTERVAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+)\s+(\w+)$").expect("interval pattern is valid")
});

const UNIT_KEYWORDS: [&str; 8] = [
    "second", "minute", "hour", "day", "week", "month", "quarter", "year",
];

/// A single value/unit pair such as `2 minutes`. Multi-part intervals are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntervalSpec {
    value: i64,
    unit: String,
}

impl IntervalSpec {
    pub fn new(value: i64, unit: impl Into<String>) -> Result<Self> {
        format!("{} {}", value, unit.into()).parse()
    }

    /// Built-in constants only; `unit` must be a single word.
    pub(crate) fn fixed(value: i64, unit: &'static str) -> Self {
        debug_assert!(!unit.is_empty() && unit.chars().all(|c| c.is_alphanumeric() || c == '_'));
        IntervalSpec {
            value,
            unit: unit.to_string(),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Singular keyword for a known plural unit (`minutes` -> `minute`).
    pub fn singular_unit(&self) -> &str {
        match self.unit.strip_suffix('s') {
            Some(stem) if UNIT_KEYWORDS.contains(&stem.to_ascii_lowercase().as_str()) => stem,
            _ => &self.unit,
        }
    }
}

impl FromStr for IntervalSpec {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = INTERVAL_RE
            .captures(s)
            .ok_or_else(|| DialectError::InvalidInterval(s.to_string()))?;
        let value = caps[1]
            .parse::<i64>()
            .map_err(|_| DialectError::InvalidInterval(s.to_string()))?;
        Ok(IntervalSpec {
            value,
            unit: caps[2].to_string(),
        })
    }
}

impl fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl Serialize for IntervalSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IntervalSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_and_unit() {
        let spec: IntervalSpec = "2 minutes".parse().unwrap();
        assert_eq!(spec.value(), 2);
        assert_eq!(spec.unit(), "minutes");
        assert_eq!(spec.to_string(), "2 minutes");
    }

    #[test]
    fn accepts_negative_values_and_wide_spacing() {
        let spec: IntervalSpec = "-7   day".parse().unwrap();
        assert_eq!(spec.value(), -7);
        assert_eq!(spec.unit(), "day");
    }

    #[test]
    fn rejects_malformed_specs() {
        for bad in [
            "",
            "minutes",
            "2",
            "1.5 hours",
            "1 day 2 hours",
            " 2 minutes",
            "2 minutes ",
            "two minutes",
            "99999999999999999999 days",
        ] {
            assert!(
                matches!(bad.parse::<IntervalSpec>(), Err(DialectError::InvalidInterval(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn singularizes_known_units_only() {
        let plural: IntervalSpec = "2 minutes".parse().unwrap();
        assert_eq!(plural.singular_unit(), "minute");
        let singular: IntervalSpec = "1 hour".parse().unwrap();
        assert_eq!(singular.singular_unit(), "hour");
        let other: IntervalSpec = "3 millis".parse().unwrap();
        assert_eq!(other.singular_unit(), "millis");
    }

    #[test]
    fn deserializes_from_string() {
        let spec: IntervalSpec = serde_json::from_str("\"10 seconds\"").unwrap();
        assert_eq!(spec, IntervalSpec::new(10, "seconds").unwrap());
        assert!(serde_json::from_str::<IntervalSpec>("\"soon\"").is_err());
    }
}
