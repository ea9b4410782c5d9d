//! Function-call template registry shared by all dialects.
//!
//! The base registry is immutable; a dialect contributes an overlay and the
//! compiler works with `base ⊕ overlay`, where the overlay wins on key collision.

use std::collections::BTreeMap;

use crate::error::{DialectError, Result};

/// Placeholder the template engine replaces with the rendered argument list.
pub const ARGS_PLACEHOLDER: &str = "{{ args_concat }}";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlTemplates {
    functions: BTreeMap<String, String>,
}

impl SqlTemplates {
    /// Templates every dialect starts from.
    pub fn base() -> Self {
        let functions = [
            ("SUM", "SUM"),
            ("MIN", "MIN"),
            ("MAX", "MAX"),
            ("COUNT", "COUNT"),
            ("AVG", "AVG"),
            ("STDDEV_POP", "STDDEV_POP"),
            ("STDDEV_SAMP", "STDDEV_SAMP"),
            ("VAR_POP", "VAR_POP"),
            ("VAR_SAMP", "VAR_SAMP"),
            ("COALESCE", "COALESCE"),
            ("CONCAT", "CONCAT"),
            ("LOWER", "LOWER"),
            ("UPPER", "UPPER"),
            ("LEFT", "LEFT"),
            ("RIGHT", "RIGHT"),
            ("TRIM", "TRIM"),
            ("NULLIF", "NULLIF"),
            ("GREATEST", "GREATEST"),
            ("LEAST", "LEAST"),
            ("ABS", "ABS"),
            ("CEIL", "CEIL"),
            ("FLOOR", "FLOOR"),
            ("ROUND", "ROUND"),
        ]
        .into_iter()
        .map(|(name, call)| (name.to_string(), format!("{call}({ARGS_PLACEHOLDER})")))
        .collect();
        Self { functions }
    }

    pub fn function(&self, name: &str) -> Option<&str> {
        self.functions.get(name).map(String::as_str)
    }

    pub fn functions(&self) -> &BTreeMap<String, String> {
        &self.functions
    }

    /// Returns a new registry with `overlay` merged over `self`.
    pub fn with_overlay(&self, overlay: BTreeMap<String, String>) -> Result<Self> {
        let mut functions = self.functions.clone();
        for (name, template) in overlay {
            if !template.contains(ARGS_PLACEHOLDER) {
                return Err(DialectError::InvalidTemplate { name, template });
            }
            functions.insert(name, template);
        }
        Ok(Self { functions })
    }
}
