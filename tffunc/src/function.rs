//! Host-side calling convention for functions
//!
//! A `Function` pairs a static signature with an implementation. `Function::call`
//! checks arity, nullability and argument types against the signature before
//! the implementation runs, and answers a top-level unknown argument for a
//! parameter that does not allow unknowns with an unknown result directly.

use crate::attribute_type::AttributeType;
use crate::error::{Result, TffuncError};
use crate::types::{Diagnostics, Dynamic};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// One positional parameter as the host sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_: AttributeType,
    pub allow_null: bool,
    /// Only blocks a top-level unknown; nested unknowns are not inspected here
    pub allow_unknown: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_: AttributeType) -> Self {
        Self {
            name: name.into(),
            type_,
            allow_null: false,
            allow_unknown: false,
        }
    }

    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }
}

/// Body of a function, run once the arguments passed the host checks
#[async_trait]
pub trait FunctionImpl: Send + Sync {
    async fn call(&self, args: Vec<Dynamic>, ret_type: &AttributeType) -> CallOutcome;
}

/// Result of running a function body
///
/// `value` is always present. On failure it is an unknown of the return type so
/// callers that only look at the value still see a correctly typed placeholder.
#[derive(Debug)]
pub struct CallOutcome {
    pub value: Dynamic,
    pub error: Option<TffuncError>,
    /// Diagnostics below error severity reported alongside the result
    pub warnings: Diagnostics,
}

impl CallOutcome {
    pub fn ok(value: Dynamic) -> Self {
        Self {
            value,
            error: None,
            warnings: Diagnostics::new(),
        }
    }

    /// Unknown result without an error, e.g. when arguments are not yet known
    pub fn unknown(ret_type: &AttributeType) -> Self {
        Self::ok(Dynamic::unknown(ret_type.clone()))
    }

    pub fn failed(ret_type: &AttributeType, error: TffuncError) -> Self {
        Self {
            value: Dynamic::unknown(ret_type.clone()),
            error: Some(error),
            warnings: Diagnostics::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Diagnostics) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drops warnings and the placeholder value on error
    pub fn into_result(self) -> Result<Dynamic> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

/// Everything needed to construct a `Function`
pub struct FunctionSpec {
    pub description: String,
    pub params: Vec<Parameter>,
    pub var_param: Option<Parameter>,
    pub return_type: AttributeType,
    pub imp: Arc<dyn FunctionImpl>,
}

/// A callable function with a static return type
#[derive(Clone)]
pub struct Function {
    spec: Arc<FunctionSpec>,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.spec.params)
            .field("var_param", &self.spec.var_param)
            .field("return_type", &self.spec.return_type)
            .finish_non_exhaustive()
    }
}

impl Function {
    pub fn new(spec: FunctionSpec) -> Self {
        Self {
            spec: Arc::new(spec),
        }
    }

    pub fn params(&self) -> &[Parameter] {
        &self.spec.params
    }

    pub fn var_param(&self) -> Option<&Parameter> {
        self.spec.var_param.as_ref()
    }

    pub fn return_type(&self) -> &AttributeType {
        &self.spec.return_type
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    /// Parameter governing the argument at `index`
    pub fn param_for(&self, index: usize) -> Option<&Parameter> {
        self.spec
            .params
            .get(index)
            .or(self.spec.var_param.as_ref())
    }

    /// Check the arguments against the signature and run the implementation.
    /// `Err` is returned only when the arguments do not fit the signature.
    pub async fn call(&self, args: Vec<Dynamic>) -> Result<CallOutcome> {
        self.check_arity(args.len())?;

        let mut top_level_unknown = false;
        for (index, arg) in args.iter().enumerate() {
            let param = self.param_for(index).ok_or_else(|| TffuncError::ArityMismatch {
                expected: self.expected_arity(),
                actual: args.len(),
            })?;

            if arg.is_null() && !param.allow_null {
                return Err(TffuncError::NullArgument {
                    index,
                    param: param.name.clone(),
                });
            }

            if !arg.conforms_to(&param.type_) {
                return Err(TffuncError::ArgumentTypeMismatch {
                    index,
                    param: param.name.clone(),
                    expected: param.type_.to_string(),
                    actual: arg.type_of().to_string(),
                });
            }

            if !arg.is_known() && !param.allow_unknown {
                top_level_unknown = true;
            }
        }

        let ret_type = &self.spec.return_type;
        if top_level_unknown {
            return Ok(CallOutcome::unknown(ret_type));
        }

        let outcome = self.spec.imp.call(args, ret_type).await;
        if !outcome.value.conforms_to(ret_type) {
            let error = TffuncError::ReturnTypeMismatch {
                expected: ret_type.to_string(),
                actual: outcome.value.type_of().to_string(),
            };
            return Ok(CallOutcome::failed(ret_type, error).with_warnings(outcome.warnings));
        }
        Ok(outcome)
    }

    fn check_arity(&self, actual: usize) -> Result<()> {
        let fixed = self.spec.params.len();
        let fits = match self.spec.var_param {
            Some(_) => actual >= fixed,
            None => actual == fixed,
        };
        if fits {
            Ok(())
        } else {
            Err(TffuncError::ArityMismatch {
                expected: self.expected_arity(),
                actual,
            })
        }
    }

    fn expected_arity(&self) -> String {
        match self.spec.var_param {
            Some(_) => format!("at least {}", self.spec.params.len()),
            None => self.spec.params.len().to_string(),
        }
    }
}
