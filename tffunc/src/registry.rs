//! Registry of provider functions in the host's function namespace
//!
//! Provider functions are exposed to expressions under a qualified name such as
//! `provider::dns::reverse_lookup`. The registry builds one `Function` per
//! declaration, all sharing the provider's factory.

use crate::decl::FunctionDecl;
use crate::error::{Result, TffuncError};
use crate::function::{CallOutcome, Function};
use crate::provider::ProviderFactory;
use crate::types::Dynamic;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};
use tracing::debug;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern is valid"));

/// Naming configuration for a provider's functions
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Leading namespace segment
    pub namespace: String,
    /// Separator between name segments
    pub separator: String,
    /// Local name the provider is known by in the host configuration
    pub local_name: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: "provider".to_string(),
            separator: "::".to_string(),
            local_name: String::new(),
        }
    }
}

impl RegistryConfig {
    /// Create a configuration for the provider with the given local name
    pub fn new(local_name: impl Into<String>) -> Self {
        Self::default().with_local_name(local_name)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_local_name(mut self, local_name: impl Into<String>) -> Self {
        self.local_name = local_name.into();
        self
    }

    /// Fully qualified name for a function of this provider
    pub fn qualify(&self, function: &str) -> String {
        [self.namespace.as_str(), &self.local_name, function].join(&self.separator)
    }
}

/// Functions of one provider, keyed by qualified name
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, Function>,
}

impl FunctionRegistry {
    /// Build every declared function of a provider.
    ///
    /// Declarations come from the provider itself, so the names passed to the
    /// adapter always match what the provider registered. Names that are not
    /// valid identifiers are rejected.
    pub fn for_provider(
        config: RegistryConfig,
        decls: &HashMap<String, FunctionDecl>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Result<Self> {
        validate_identifier(&config.local_name)?;

        let mut functions = BTreeMap::new();
        for (name, decl) in decls {
            validate_identifier(name)?;
            let qualified = config.qualify(name);
            debug!(function = %qualified, "registering provider function");
            functions.insert(qualified, decl.build_function(name.clone(), factory.clone()));
        }

        Ok(Self { functions })
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Function> {
        self.functions.get(qualified_name)
    }

    /// Call a registered function by its qualified name
    pub async fn call(&self, qualified_name: &str, args: Vec<Dynamic>) -> Result<CallOutcome> {
        let function = self
            .get(qualified_name)
            .ok_or_else(|| TffuncError::FunctionNotFound(qualified_name.to_string()))?;
        function.call(args).await
    }

    /// Qualified names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn validate_identifier(name: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(TffuncError::InvalidFunctionName(name.to_string()))
    }
}
