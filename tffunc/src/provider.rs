//! Provider handle and factory traits
//!
//! A provider owns and executes function bodies out of process. This crate only
//! sees it through `ProviderInterface`, obtained per call from a
//! `ProviderFactory`.

use crate::error::BoxError;
use crate::types::{Diagnostics, Dynamic};
use async_trait::async_trait;

/// Handle to a running, unconfigured provider
#[async_trait]
pub trait ProviderInterface: Send + Sync {
    /// Execute the named function against the given arguments
    async fn call_function(&self, request: CallFunctionRequest) -> CallFunctionResponse;

    /// Release the handle (terminating the plugin process if the handle owns it)
    async fn close(&self) -> std::result::Result<(), BoxError>;
}

/// Produces handles to the provider a function declaration belongs to
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn acquire(&self) -> std::result::Result<Box<dyn ProviderInterface>, BoxError>;
}

#[async_trait]
impl<F> ProviderFactory for F
where
    F: Fn() -> std::result::Result<Box<dyn ProviderInterface>, BoxError> + Send + Sync,
{
    async fn acquire(&self) -> std::result::Result<Box<dyn ProviderInterface>, BoxError> {
        self()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallFunctionRequest {
    pub function_name: String,
    pub arguments: Vec<Dynamic>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallFunctionResponse {
    /// `None` means the provider produced no value at all, which is distinct
    /// from a typed null
    pub result: Option<Dynamic>,
    pub diagnostics: Diagnostics,
}

impl CallFunctionResponse {
    pub fn success(result: Dynamic) -> Self {
        Self {
            result: Some(result),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn failure(diagnostics: Diagnostics) -> Self {
        Self {
            result: None,
            diagnostics,
        }
    }
}
