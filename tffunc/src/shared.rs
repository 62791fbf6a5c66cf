//! Memoizing provider factory
//!
//! Starting a provider plugin is expensive, and the adapter asks its factory
//! for a provider on every call. `SharedProviderFactory` launches the provider
//! once and hands out handles that all talk to that one instance.

use crate::error::BoxError;
use crate::provider::{CallFunctionRequest, CallFunctionResponse, ProviderFactory, ProviderInterface};
use crate::types::Diagnostics;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

type SharedSlot = Arc<Mutex<Option<Box<dyn ProviderInterface>>>>;

/// Factory that launches its provider lazily, at most once
///
/// Handles returned by `acquire` serialize their calls on the shared provider,
/// and closing them does not stop it. Call `shutdown` to close the provider.
pub struct SharedProviderFactory {
    launcher: Arc<dyn ProviderFactory>,
    provider: OnceCell<SharedSlot>,
}

impl SharedProviderFactory {
    pub fn new(launcher: Arc<dyn ProviderFactory>) -> Self {
        Self {
            launcher,
            provider: OnceCell::new(),
        }
    }

    /// Whether the provider has been launched successfully
    pub fn is_launched(&self) -> bool {
        self.provider.initialized()
    }

    /// Close the shared provider. Does nothing if it was never launched or is
    /// already shut down.
    pub async fn shutdown(&self) -> std::result::Result<(), BoxError> {
        let Some(slot) = self.provider.get() else {
            return Ok(());
        };

        let provider = slot.lock().await.take();
        if let Some(provider) = provider {
            debug!("shutting down shared provider");
            provider.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderFactory for SharedProviderFactory {
    async fn acquire(&self) -> std::result::Result<Box<dyn ProviderInterface>, BoxError> {
        // A failed launch leaves the cell empty, so the next acquire retries.
        let slot = self
            .provider
            .get_or_try_init(|| async {
                debug!("launching shared provider");
                let provider = self.launcher.acquire().await?;
                Ok::<_, BoxError>(Arc::new(Mutex::new(Some(provider))))
            })
            .await?;

        if slot.lock().await.is_none() {
            return Err("provider has been shut down".into());
        }

        Ok(Box::new(SharedHandle {
            provider: slot.clone(),
        }))
    }
}

struct SharedHandle {
    provider: SharedSlot,
}

#[async_trait]
impl ProviderInterface for SharedHandle {
    async fn call_function(&self, request: CallFunctionRequest) -> CallFunctionResponse {
        let guard = self.provider.lock().await;
        match guard.as_ref() {
            Some(provider) => provider.call_function(request).await,
            None => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_error(
                    "provider has been shut down",
                    Some(format!("cannot call function {}", request.function_name)),
                );
                CallFunctionResponse::failure(diagnostics)
            }
        }
    }

    async fn close(&self) -> std::result::Result<(), BoxError> {
        // The shared provider outlives individual handles.
        Ok(())
    }
}
