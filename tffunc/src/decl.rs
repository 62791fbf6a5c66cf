//! Function declarations advertised by a provider
//!
//! A `FunctionDecl` is the static signature of one provider function. It is
//! immutable once built and shared read-only by every call of the function
//! produced from it (see `FunctionDecl::build_function` in the adapter module).

use crate::attribute_type::AttributeType;
use crate::function::Parameter;
use serde::{Deserialize, Serialize};

/// How a description string should be rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringKind {
    #[default]
    Plain,
    Markdown,
}

/// One parameter of a provider function
///
/// Arguments bind by position; `name` is only used for documentation and
/// error messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: AttributeType,
    #[serde(default)]
    pub nullable: bool,
    /// Whether the provider accepts an argument that is not wholly known
    #[serde(default)]
    pub allow_unknown_values: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_kind: StringKind,
}

impl FunctionParam {
    pub fn new(name: impl Into<String>, type_: AttributeType) -> Self {
        Self {
            name: name.into(),
            type_,
            nullable: false,
            allow_unknown_values: false,
            description: String::new(),
            description_kind: StringKind::Plain,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn allow_unknown_values(mut self) -> Self {
        self.allow_unknown_values = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Host-side parameter for this declaration.
    ///
    /// `allow_unknown` is carried over, but the host only uses it to block a
    /// top-level unknown. Unknowns nested inside a known value get through, so
    /// the adapter re-checks `allow_unknown_values` against the whole value.
    pub fn to_parameter(&self) -> Parameter {
        Parameter {
            name: self.name.clone(),
            type_: self.type_.clone(),
            allow_null: self.nullable,
            allow_unknown: self.allow_unknown_values,
        }
    }
}

/// Signature of a provider function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    #[serde(default)]
    pub parameters: Vec<FunctionParam>,
    #[serde(default)]
    pub variadic_parameter: Option<FunctionParam>,
    pub return_type: AttributeType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_kind: StringKind,
}

impl FunctionDecl {
    pub fn new(return_type: AttributeType) -> Self {
        Self {
            parameters: Vec::new(),
            variadic_parameter: None,
            return_type,
            description: String::new(),
            description_kind: StringKind::Plain,
        }
    }

    pub fn parameter(mut self, param: FunctionParam) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn variadic(mut self, param: FunctionParam) -> Self {
        self.variadic_parameter = Some(param);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declaration governing the argument at `index`: a fixed parameter inside
    /// the prefix, the variadic parameter beyond it.
    pub fn param_for(&self, index: usize) -> Option<&FunctionParam> {
        self.parameters
            .get(index)
            .or(self.variadic_parameter.as_ref())
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic_parameter.is_some()
    }
}
