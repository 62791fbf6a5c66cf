//! Tests for provider function registries backed by a shared provider

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tffunc::{
    AttributeType, BoxError, CallFunctionRequest, CallFunctionResponse, Diagnostics, Dynamic,
    FunctionDecl, FunctionParam, FunctionRegistry, ProviderInterface, RegistryConfig,
    SharedProviderFactory,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Provider that tracks how many calls run at the same time
struct StringsProvider {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl ProviderInterface for StringsProvider {
    async fn call_function(&self, request: CallFunctionRequest) -> CallFunctionResponse {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match request.function_name.as_str() {
            "upper" => {
                let input = request.arguments[0].as_string().unwrap_or_default();
                CallFunctionResponse::success(Dynamic::string(input.to_uppercase()))
            }
            "repeat" => {
                let input = request.arguments[0].as_string().unwrap_or_default();
                let count = request.arguments[1].as_number().unwrap_or(0.0) as usize;
                let mut diagnostics = Diagnostics::new();
                if count > 2 {
                    diagnostics.add_warning("large repeat count", Some(format!("{}", count)));
                }
                CallFunctionResponse {
                    result: Some(Dynamic::string(input.repeat(count))),
                    diagnostics,
                }
            }
            other => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_error("unknown function", Some(other.to_string()));
                CallFunctionResponse::failure(diagnostics)
            }
        }
    }

    async fn close(&self) -> Result<(), BoxError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    registry: FunctionRegistry,
    shared: Arc<SharedProviderFactory>,
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

fn harness() -> Harness {
    let launches = Arc::new(AtomicUsize::new(0));
    let closes = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let launcher = {
        let launches = launches.clone();
        let closes = closes.clone();
        let max_in_flight = max_in_flight.clone();
        let in_flight = Arc::new(AtomicUsize::new(0));
        move || -> Result<Box<dyn ProviderInterface>, BoxError> {
            launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StringsProvider {
                in_flight: in_flight.clone(),
                max_in_flight: max_in_flight.clone(),
                closes: closes.clone(),
            }))
        }
    };
    let shared = Arc::new(SharedProviderFactory::new(Arc::new(launcher)));

    let mut decls = HashMap::new();
    decls.insert(
        "upper".to_string(),
        FunctionDecl::new(AttributeType::String)
            .parameter(FunctionParam::new("input", AttributeType::String)),
    );
    decls.insert(
        "repeat".to_string(),
        FunctionDecl::new(AttributeType::String)
            .parameter(FunctionParam::new("input", AttributeType::String))
            .parameter(FunctionParam::new("count", AttributeType::Number)),
    );

    let registry =
        FunctionRegistry::for_provider(RegistryConfig::new("strings"), &decls, shared.clone())
            .unwrap();

    Harness {
        registry,
        shared,
        launches,
        closes,
        max_in_flight,
    }
}

#[tokio::test]
async fn calls_through_registry_share_one_provider() {
    init_tracing();
    let h = harness();

    let upper = h
        .registry
        .call("provider::strings::upper", vec!["abc".into()])
        .await
        .unwrap();
    let repeat = h
        .registry
        .call("provider::strings::repeat", vec!["ab".into(), 2_i64.into()])
        .await
        .unwrap();

    assert_eq!(upper.into_result().unwrap(), Dynamic::string("ABC"));
    assert_eq!(repeat.into_result().unwrap(), Dynamic::string("abab"));
    assert_eq!(h.launches.load(Ordering::SeqCst), 1);
    assert_eq!(h.closes.load(Ordering::SeqCst), 0);

    h.shared.shutdown().await.unwrap();
    assert_eq!(h.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_calls_serialize_on_shared_provider() {
    init_tracing();
    let h = harness();

    let calls = (0..10).map(|i| {
        h.registry
            .call("provider::strings::upper", vec![format!("item{}", i).into()])
    });
    let outcomes = futures::future::join_all(calls).await;

    for (i, outcome) in outcomes.into_iter().enumerate() {
        let value = outcome.unwrap().into_result().unwrap();
        assert_eq!(value, Dynamic::string(format!("ITEM{}", i)));
    }
    assert_eq!(h.launches.load(Ordering::SeqCst), 1);
    assert_eq!(h.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn warnings_are_surfaced_on_outcome() {
    init_tracing();
    let h = harness();

    let outcome = h
        .registry
        .call("provider::strings::repeat", vec!["a".into(), 3_i64.into()])
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert_eq!(outcome.value, Dynamic::string("aaa"));
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings.to_string(), "large repeat count: 3");
}

#[tokio::test]
async fn unknown_argument_does_not_launch_provider() {
    init_tracing();
    let h = harness();

    let outcome = h
        .registry
        .call(
            "provider::strings::repeat",
            vec!["a".into(), Dynamic::unknown(AttributeType::Number)],
        )
        .await
        .unwrap();

    assert_eq!(outcome.value, Dynamic::unknown(AttributeType::String));
    assert!(!h.shared.is_launched());
    assert_eq!(h.launches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn calls_after_shutdown_fail_with_launch_error() {
    init_tracing();
    let h = harness();

    h.registry
        .call("provider::strings::upper", vec!["a".into()])
        .await
        .unwrap();
    h.shared.shutdown().await.unwrap();

    let outcome = h
        .registry
        .call("provider::strings::upper", vec!["a".into()])
        .await
        .unwrap();

    assert_eq!(outcome.value, Dynamic::unknown(AttributeType::String));
    assert_eq!(
        outcome.error.unwrap().to_string(),
        "failed to launch provider plugin: provider has been shut down"
    );
}

#[test]
fn registry_works_from_blocking_code() {
    let h = harness();

    let outcome = tokio_test::block_on(
        h.registry
            .call("provider::strings::upper", vec!["sync".into()]),
    )
    .unwrap();

    assert_eq!(outcome.into_result().unwrap(), Dynamic::string("SYNC"));
}
