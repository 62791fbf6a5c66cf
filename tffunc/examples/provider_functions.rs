//! Registers the functions of an in-process provider and calls them the way an
//! expression evaluator would during planning and apply.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tffunc::{
    AttributeType, BoxError, CallFunctionRequest, CallFunctionResponse, Diagnostics, Dynamic,
    FunctionDecl, FunctionParam, FunctionRegistry, ProviderInterface, RegistryConfig,
    SharedProviderFactory,
};

struct NetProvider;

#[async_trait]
impl ProviderInterface for NetProvider {
    async fn call_function(&self, request: CallFunctionRequest) -> CallFunctionResponse {
        match request.function_name.as_str() {
            "cidrhost" => {
                let prefix = request.arguments[0].as_string().unwrap_or_default();
                let host = request.arguments[1].as_number().unwrap_or_default() as u32;
                match prefix.split_once('/') {
                    Some((network, _)) => {
                        let base: Vec<&str> = network.rsplitn(2, '.').collect();
                        let address = format!("{}.{}", base.last().unwrap_or(&""), host);
                        CallFunctionResponse::success(Dynamic::string(address))
                    }
                    None => {
                        let mut diagnostics = Diagnostics::new();
                        diagnostics.add_error("invalid CIDR prefix", Some(prefix.to_string()));
                        CallFunctionResponse::failure(diagnostics)
                    }
                }
            }
            other => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_error("unsupported function", Some(other.to_string()));
                CallFunctionResponse::failure(diagnostics)
            }
        }
    }

    async fn close(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let launcher = || -> Result<Box<dyn ProviderInterface>, BoxError> { Ok(Box::new(NetProvider)) };
    let shared = Arc::new(SharedProviderFactory::new(Arc::new(launcher)));

    let mut decls = HashMap::new();
    decls.insert(
        "cidrhost".to_string(),
        FunctionDecl::new(AttributeType::String)
            .parameter(FunctionParam::new("prefix", AttributeType::String))
            .parameter(FunctionParam::new("hostnum", AttributeType::Number))
            .description("Calculates a host address within a network prefix"),
    );
    let registry = FunctionRegistry::for_provider(RegistryConfig::new("net"), &decls, shared.clone())?;

    // Planning: the host number is not known yet.
    let planned = registry
        .call(
            "provider::net::cidrhost",
            vec!["10.1.2.0/24".into(), Dynamic::unknown(AttributeType::Number)],
        )
        .await?;
    println!("plan:  {:?}", planned.value);

    // Apply: everything is known.
    let applied = registry
        .call("provider::net::cidrhost", vec!["10.1.2.0/24".into(), 5_i64.into()])
        .await?
        .into_result()?;
    println!("apply: {:?}", applied);

    shared.shutdown().await?;
    Ok(())
}
