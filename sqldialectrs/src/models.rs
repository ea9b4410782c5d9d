//! Dialect-agnostic value descriptors handed to the adapters by the compiler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// Unit a timestamp is truncated to when grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeGranularity {
    pub const ALL: [TimeGranularity; 8] = [
        TimeGranularity::Second,
        TimeGranularity::Minute,
        TimeGranularity::Hour,
        TimeGranularity::Day,
        TimeGranularity::Week,
        TimeGranularity::Month,
        TimeGranularity::Quarter,
        TimeGranularity::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGranularity::Second => "second",
            TimeGranularity::Minute => "minute",
            TimeGranularity::Hour => "hour",
            TimeGranularity::Day => "day",
            TimeGranularity::Week => "week",
            TimeGranularity::Month => "month",
            TimeGranularity::Quarter => "quarter",
            TimeGranularity::Year => "year",
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeGranularity {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        TimeGranularity::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| DialectError::UnknownGranularity(s.to_string()))
    }
}

/// Declared type of the value a filter compares against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterValueType {
    Boolean,
    Number,
    String,
    #[default]
    Default,
}

/// Cast a dialect applies to a bound filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCast {
    Boolean,
    Numeric,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDescriptor {
    /// Member or column the filter applies to.
    pub member: String,
    pub negate: bool,
    /// True when the compared value is a measure expression.
    pub is_measure: bool,
    #[serde(rename = "type")]
    pub value_type: FilterValueType,
}

impl FilterDescriptor {
    pub fn new(member: impl Into<String>, value_type: FilterValueType) -> Self {
        Self {
            member: member.into(),
            value_type,
            ..Default::default()
        }
    }

    pub fn measure(member: impl Into<String>, value_type: FilterValueType) -> Self {
        Self {
            is_measure: true,
            ..Self::new(member, value_type)
        }
    }

    /// Measures compare numerically unless declared boolean.
    pub fn param_cast(&self) -> ParamCast {
        match self.value_type {
            FilterValueType::Boolean => ParamCast::Boolean,
            FilterValueType::Number => ParamCast::Numeric,
            _ if self.is_measure => ParamCast::Numeric,
            _ => ParamCast::None,
        }
    }
}

/// Where the wildcard goes in a case-insensitive pattern match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeMatchType {
    #[default]
    Contains,
    Starts,
    Ends,
}

impl LikeMatchType {
    /// `None` means the compiler did not specify a match type.
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value {
            None => Ok(LikeMatchType::default()),
            Some(s) => s.parse(),
        }
    }

    pub fn leading_wildcard(&self) -> bool {
        matches!(self, LikeMatchType::Contains | LikeMatchType::Ends)
    }

    pub fn trailing_wildcard(&self) -> bool {
        matches!(self, LikeMatchType::Contains | LikeMatchType::Starts)
    }
}

impl FromStr for LikeMatchType {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contains" => Ok(LikeMatchType::Contains),
            "starts" => Ok(LikeMatchType::Starts),
            "ends" => Ok(LikeMatchType::Ends),
            other => Err(DialectError::UnsupportedMatchType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_granularity_name() {
        for g in TimeGranularity::ALL {
            assert_eq!(g.as_str().parse::<TimeGranularity>().unwrap(), g);
        }
    }

    #[test]
    fn rejects_unknown_granularity() {
        let err = "fortnight".parse::<TimeGranularity>().unwrap_err();
        assert!(matches!(err, DialectError::UnknownGranularity(g) if g == "fortnight"));
        // Names are matched exactly.
        assert!("Day".parse::<TimeGranularity>().is_err());
    }

    #[test]
    fn measure_filters_default_to_numeric_cast() {
        let plain = FilterDescriptor::new("orders.status", FilterValueType::String);
        assert_eq!(plain.param_cast(), ParamCast::None);

        let measure = FilterDescriptor::measure("orders.count", FilterValueType::Default);
        assert_eq!(measure.param_cast(), ParamCast::Numeric);

        let bool_measure = FilterDescriptor::measure("orders.flag", FilterValueType::Boolean);
        assert_eq!(bool_measure.param_cast(), ParamCast::Boolean);

        let number = FilterDescriptor::new("orders.amount", FilterValueType::Number);
        assert_eq!(number.param_cast(), ParamCast::Numeric);
    }

    #[test]
    fn like_match_type_defaults_to_contains() {
        assert_eq!(LikeMatchType::parse(None).unwrap(), LikeMatchType::Contains);
        assert_eq!(
            LikeMatchType::parse(Some("starts")).unwrap(),
            LikeMatchType::Starts
        );
        assert!(matches!(
            LikeMatchType::parse(Some("regex")),
            Err(DialectError::UnsupportedMatchType(_))
        ));
    }

    #[test]
    fn filter_descriptor_deserializes_declared_type() {
        let desc: FilterDescriptor =
            serde_json::from_str(r#"{"member": "users.active", "type": "boolean"}"#).unwrap();
        assert_eq!(desc.value_type, FilterValueType::Boolean);
        assert!(!desc.negate);
        assert!(!desc.is_measure);
    }
}
