//! Adapter from provider function declarations to host functions
//!
//! Each call of a built function runs the same sequence: gate on unknown
//! arguments, acquire a provider from the factory, invoke the function
//! remotely, interpret the response, close the provider. Nothing is kept
//! between calls.

use crate::attribute_type::AttributeType;
use crate::decl::FunctionDecl;
use crate::error::TffuncError;
use crate::function::{CallOutcome, Function, FunctionImpl, FunctionSpec};
use crate::provider::{CallFunctionRequest, ProviderFactory};
use crate::types::Dynamic;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

impl FunctionDecl {
    /// Build a host function that calls `name` on the provider returned by
    /// `factory`.
    ///
    /// `name` must be the name under which the provider registered this
    /// declaration. The factory must return unconfigured handles to the
    /// provider this declaration belongs to. Neither is verified here; breaking
    /// either leaves the behavior of the returned function up to the provider.
    ///
    /// The factory is called once per function call, so callers should pass one
    /// that reuses a running plugin (see `SharedProviderFactory`) to avoid a
    /// startup cost on every call.
    pub fn build_function(
        &self,
        name: impl Into<String>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Function {
        let params = self
            .parameters
            .iter()
            .map(|param| param.to_parameter())
            .collect();
        let var_param = self
            .variadic_parameter
            .as_ref()
            .map(|param| param.to_parameter());

        Function::new(FunctionSpec {
            description: self.description.clone(),
            params,
            var_param,
            return_type: self.return_type.clone(),
            imp: Arc::new(ProviderFunction {
                name: name.into(),
                decl: self.clone(),
                factory,
            }),
        })
    }
}

struct ProviderFunction {
    name: String,
    decl: FunctionDecl,
    factory: Arc<dyn ProviderFactory>,
}

impl ProviderFunction {
    /// Index of the first argument whose parameter refuses unknowns but which
    /// is not wholly known
    fn gated_argument(&self, args: &[Dynamic]) -> Option<usize> {
        args.iter().enumerate().position(|(index, arg)| {
            let allows_unknown = self
                .decl
                .param_for(index)
                .is_some_and(|param| param.allow_unknown_values);
            !allows_unknown && !arg.is_wholly_known()
        })
    }
}

#[async_trait]
impl FunctionImpl for ProviderFunction {
    async fn call(&self, args: Vec<Dynamic>, ret_type: &AttributeType) -> CallOutcome {
        // Providers that did not opt in must never see an unknown, not even
        // one nested inside a known collection.
        if let Some(index) = self.gated_argument(&args) {
            debug!(
                function = %self.name,
                argument = index,
                "argument not wholly known, returning unknown result"
            );
            return CallOutcome::unknown(ret_type);
        }

        let provider = match self.factory.acquire().await {
            Ok(provider) => provider,
            Err(e) => return CallOutcome::failed(ret_type, TffuncError::ProviderLaunch(e)),
        };

        debug!(function = %self.name, arguments = args.len(), "calling provider function");
        let resp = provider
            .call_function(CallFunctionRequest {
                function_name: self.name.clone(),
                arguments: args,
            })
            .await;

        let warnings = resp.diagnostics.warnings();
        if !warnings.is_empty() {
            warn!(function = %self.name, warnings = %warnings, "provider function reported warnings");
        }

        if let Some(err) = resp.diagnostics.err() {
            return CallOutcome::failed(ret_type, err).with_warnings(warnings);
        }

        let result = match resp.result {
            Some(result) => result,
            None => {
                return CallOutcome::failed(ret_type, TffuncError::NoResult)
                    .with_warnings(warnings)
            }
        };

        // A close failure discards the result even though the call succeeded.
        if let Err(e) = provider.close().await {
            warn!(function = %self.name, error = %e, "failed to close provider after function call");
            return CallOutcome::failed(ret_type, TffuncError::ProviderTerminate(e))
                .with_warnings(warnings);
        }

        debug!(function = %self.name, "provider function returned");
        CallOutcome::ok(result).with_warnings(warnings)
    }
}
