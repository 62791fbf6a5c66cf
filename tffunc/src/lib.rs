//! tffunc - provider functions for Terraform-style expression hosts
//!
//! Turns the function declarations a provider plugin advertises into functions
//! the host evaluator can call directly. Calls are gated on unknown arguments,
//! forwarded to a provider obtained from a caller-supplied factory, and always
//! produce a value of the declared return type.

// Core modules
pub mod attribute_type;
pub mod error;
pub mod types;

// Host calling convention
pub mod function;

// Provider function API
pub mod adapter;
pub mod decl;
pub mod provider;

// Helper modules
pub mod registry;
pub mod shared;

// Re-exports for convenience
pub use attribute_type::AttributeType;
pub use decl::{FunctionDecl, FunctionParam, StringKind};
pub use error::{BoxError, Result, TffuncError};
pub use function::{CallOutcome, Function, FunctionImpl, FunctionSpec, Parameter};
pub use provider::{CallFunctionRequest, CallFunctionResponse, ProviderFactory, ProviderInterface};
pub use registry::{FunctionRegistry, RegistryConfig};
pub use shared::SharedProviderFactory;
pub use types::{Diagnostic, DiagnosticSeverity, Diagnostics, Dynamic};
