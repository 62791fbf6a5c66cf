//! Core value types for tffunc
//!
//! This module provides the value domain passed between the host evaluator and
//! provider functions: typed nulls, typed unknowns and aggregates that may hold
//! unknowns at any depth, plus the diagnostics a provider reports back.

use crate::attribute_type::AttributeType;
use crate::error::TffuncError;
use std::collections::HashMap;
use std::fmt;

/// Dynamic represents a value of any type flowing through a function call
/// Null and unknown values keep the type they stand in for
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    /// Absence of a value of the given type
    Null(AttributeType),
    /// Value of the given type not yet known (during planning)
    Unknown(AttributeType),
    Bool(bool),
    /// Number value (all numbers are f64)
    Number(f64),
    String(String),
    /// List with its element type
    List(AttributeType, Vec<Dynamic>),
    /// Set with its element type
    Set(AttributeType, Vec<Dynamic>),
    /// Map with its element type
    Map(AttributeType, HashMap<String, Dynamic>),
    Object(HashMap<String, Dynamic>),
    Tuple(Vec<Dynamic>),
}

impl Dynamic {
    pub fn null(ty: AttributeType) -> Self {
        Dynamic::Null(ty)
    }

    pub fn unknown(ty: AttributeType) -> Self {
        Dynamic::Unknown(ty)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Dynamic::String(s.into())
    }

    pub fn list(elem: AttributeType, items: Vec<Dynamic>) -> Self {
        Dynamic::List(elem, items)
    }

    /// The type this value has, or stands in for when null or unknown
    pub fn type_of(&self) -> AttributeType {
        match self {
            Dynamic::Null(ty) | Dynamic::Unknown(ty) => ty.clone(),
            Dynamic::Bool(_) => AttributeType::Bool,
            Dynamic::Number(_) => AttributeType::Number,
            Dynamic::String(_) => AttributeType::String,
            Dynamic::List(elem, _) => AttributeType::list(elem.clone()),
            Dynamic::Set(elem, _) => AttributeType::set(elem.clone()),
            Dynamic::Map(elem, _) => AttributeType::map(elem.clone()),
            Dynamic::Object(attrs) => AttributeType::Object(
                attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.type_of()))
                    .collect(),
            ),
            Dynamic::Tuple(elems) => AttributeType::Tuple(elems.iter().map(Dynamic::type_of).collect()),
        }
    }

    /// Whether this value, including every element it holds, fits `ty`
    pub fn conforms_to(&self, ty: &AttributeType) -> bool {
        if !ty.accepts(&self.type_of()) {
            return false;
        }
        match (self, ty) {
            (Dynamic::List(_, items), AttributeType::List(elem))
            | (Dynamic::Set(_, items), AttributeType::Set(elem)) => {
                items.iter().all(|item| item.conforms_to(elem))
            }
            (Dynamic::Map(_, entries), AttributeType::Map(elem)) => {
                entries.values().all(|value| value.conforms_to(elem))
            }
            (Dynamic::Object(attrs), AttributeType::Object(want)) => attrs
                .iter()
                .all(|(name, value)| want.get(name).is_some_and(|t| value.conforms_to(t))),
            (Dynamic::Tuple(items), AttributeType::Tuple(want)) => {
                items.iter().zip(want).all(|(item, t)| item.conforms_to(t))
            }
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null(_))
    }

    /// Only inspects the top level; see `is_wholly_known` for nested unknowns
    pub fn is_known(&self) -> bool {
        !matches!(self, Dynamic::Unknown(_))
    }

    /// True when neither this value nor anything nested inside it is unknown
    pub fn is_wholly_known(&self) -> bool {
        match self {
            Dynamic::Unknown(_) => false,
            Dynamic::List(_, items) | Dynamic::Set(_, items) | Dynamic::Tuple(items) => {
                items.iter().all(Dynamic::is_wholly_known)
            }
            Dynamic::Map(_, entries) | Dynamic::Object(entries) => {
                entries.values().all(Dynamic::is_wholly_known)
            }
            Dynamic::Null(_) | Dynamic::Bool(_) | Dynamic::Number(_) | Dynamic::String(_) => true,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

}

impl From<bool> for Dynamic {
    fn from(b: bool) -> Self {
        Dynamic::Bool(b)
    }
}

impl From<f64> for Dynamic {
    fn from(n: f64) -> Self {
        Dynamic::Number(n)
    }
}

impl From<i64> for Dynamic {
    fn from(n: i64) -> Self {
        Dynamic::Number(n as f64)
    }
}

impl From<&str> for Dynamic {
    fn from(s: &str) -> Self {
        Dynamic::String(s.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(s: String) -> Self {
        Dynamic::String(s)
    }
}

/// Diagnostic represents a warning or error reported by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    pub detail: Option<String>,
    /// Zero-based index of the argument the diagnostic refers to
    pub function_argument: Option<usize>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>, detail: Option<impl Into<String>>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: detail.map(Into::into),
            function_argument: None,
        }
    }

    pub fn warning(summary: impl Into<String>, detail: Option<impl Into<String>>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: detail.map(Into::into),
            function_argument: None,
        }
    }

    pub fn with_argument(mut self, index: usize) -> Self {
        self.function_argument = Some(index);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.function_argument {
            write!(f, "argument {}: ", index)?;
        }
        f.write_str(&self.summary)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    diags: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.diags.push(diag);
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    pub fn has_errors(&self) -> bool {
        self.diags.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter().filter(|d| d.is_error())
    }

    /// Everything below error severity
    pub fn warnings(&self) -> Diagnostics {
        Diagnostics {
            diags: self.diags.iter().filter(|d| !d.is_error()).cloned().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diags.iter()
    }

    pub fn len(&self) -> usize {
        self.diags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.is_empty()
    }

    /// Collapses the error diagnostics into a single error, if there are any
    pub fn err(&self) -> Option<TffuncError> {
        if self.has_errors() {
            Some(TffuncError::FunctionCall(Diagnostics {
                diags: self.errors().cloned().collect(),
            }))
        } else {
            None
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diags.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", diag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    fn object(entries: Vec<(&str, Dynamic)>) -> Dynamic {
        Dynamic::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn unknown_keeps_its_type() {
        let value = Dynamic::unknown(AttributeType::list(AttributeType::String));
        assert_eq!(value.type_of(), AttributeType::list(AttributeType::String));
        assert!(!value.is_known());
        assert!(!value.is_wholly_known());
    }

    #[test]
    fn null_is_wholly_known() {
        let value = Dynamic::null(AttributeType::Number);
        assert!(value.is_null());
        assert!(value.is_wholly_known());
        assert_eq!(value.type_of(), AttributeType::Number);
    }

    #[test]
    fn nested_unknown_in_list_is_detected() {
        let value = Dynamic::list(
            AttributeType::String,
            vec!["a".into(), Dynamic::unknown(AttributeType::String)],
        );

        assert!(value.is_known());
        assert!(!value.is_wholly_known());
    }

    #[test]
    fn deeply_nested_unknown_is_detected() {
        let inner = object(vec![
            ("id", "vm-1".into()),
            ("ip", Dynamic::unknown(AttributeType::String)),
        ]);
        let value = Dynamic::Tuple(vec![true.into(), object(vec![("inner", inner)])]);

        assert!(value.is_known());
        assert!(!value.is_wholly_known());
    }

    #[test]
    fn known_aggregates_are_wholly_known() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), Dynamic::from(1_i64));
        let value = Dynamic::Map(AttributeType::Number, entries);

        assert!(value.is_wholly_known());
        assert_eq!(value.type_of(), AttributeType::map(AttributeType::Number));
    }

    #[test]
    fn object_type_is_derived_from_attributes() {
        let value = object(vec![("name", "x".into()), ("count", 2_i64.into())]);
        match value.type_of() {
            AttributeType::Object(attrs) => {
                assert_eq!(attrs.get("name"), Some(&AttributeType::String));
                assert_eq!(attrs.get("count"), Some(&AttributeType::Number));
            }
            other => panic!("Expected Object type, got {:?}", other),
        }
    }

    #[test]
    fn dynamic_element_type_does_not_hide_wrong_elements() {
        let value = Dynamic::list(AttributeType::Dynamic, vec![Dynamic::from(1_i64)]);
        let strings = AttributeType::list(AttributeType::String);

        assert!(strings.accepts(&value.type_of()));
        assert!(!value.conforms_to(&strings));
        assert!(value.conforms_to(&AttributeType::list(AttributeType::Number)));
        assert!(value.conforms_to(&AttributeType::Dynamic));
    }

    #[test]
    fn nested_elements_are_checked() {
        let value = object(vec![(
            "ports",
            Dynamic::list(AttributeType::Dynamic, vec!["80".into()]),
        )]);
        let mut attrs = HashMap::new();
        attrs.insert(
            "ports".to_string(),
            AttributeType::list(AttributeType::Number),
        );

        assert!(!value.conforms_to(&AttributeType::Object(attrs)));
    }

    #[test]
    fn diagnostics_err_only_includes_errors() {
        let mut diags = Diagnostics::new();
        diags.add_warning("deprecated", None::<String>);
        assert!(diags.err().is_none());

        diags.push(Diagnostic::error("invalid input", Some("must be positive")).with_argument(1));
        let err = diags.err().unwrap();
        assert_eq!(err.to_string(), "argument 1: invalid input: must be positive");
    }

    #[test]
    fn diagnostics_split_warnings() {
        let mut diags = Diagnostics::new();
        diags.add_error("bad", None::<String>);
        diags.add_warning("careful", Some("slow path"));

        let warnings = diags.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings.to_string(), "careful: slow path");
    }
}
