// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider catalog backed by the `[chat]` and `[providers.*]` configuration.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use danmaku_config::DanmakuConfig;
use danmaku_core::types::ProviderConfig;
use danmaku_core::{CompletionProvider, DanmakuError, ProviderCatalog};
use danmaku_openai::OpenAiProvider;
use tokio::sync::Mutex;
use tracing::debug;

/// Builds a provider instance from its connection settings.
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderConfig) -> Result<Arc<dyn CompletionProvider>, DanmakuError> + Send + Sync>;

/// Configured providers plus the active selection. Instances are created on
/// first use and cached.
pub struct ProviderRegistry {
    active_provider: Option<String>,
    active_model: Option<String>,
    configs: BTreeMap<String, ProviderConfig>,
    instances: Mutex<HashMap<String, Arc<dyn CompletionProvider>>>,
    factory: ProviderFactory,
}

impl ProviderRegistry {
    /// Builds the registry from configuration, using OpenAI-compatible providers.
    pub fn from_config(config: &DanmakuConfig) -> Self {
        let configs = config
            .providers
            .iter()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    ProviderConfig {
                        name: name.clone(),
                        base_url: entry.base_url.clone(),
                        api_key: entry.api_key.clone(),
                    },
                )
            })
            .collect();

        Self {
            active_provider: config.chat.active_provider.clone(),
            active_model: config.chat.active_model.clone(),
            configs,
            instances: Mutex::new(HashMap::new()),
            factory: Arc::new(|config| {
                let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(config)?);
                Ok(provider)
            }),
        }
    }

    /// Replaces how instances are built.
    pub fn with_factory(mut self, factory: ProviderFactory) -> Self {
        self.factory = factory;
        self
    }
}

#[async_trait]
impl ProviderCatalog for ProviderRegistry {
    fn active_provider(&self) -> Option<String> {
        self.active_provider.clone()
    }

    fn active_model(&self) -> Option<String> {
        self.active_model.clone()
    }

    fn provider_config(&self, name: &str) -> Option<ProviderConfig> {
        self.configs.get(name).cloned()
    }

    async fn provider_instance(
        &self,
        name: &str,
    ) -> Result<Arc<dyn CompletionProvider>, DanmakuError> {
        let mut instances = self.instances.lock().await;
        if let Some(instance) = instances.get(name) {
            return Ok(instance.clone());
        }

        let config = self
            .configs
            .get(name)
            .ok_or_else(|| DanmakuError::provider(format!("unknown provider `{name}`")))?;
        let instance = (self.factory)(config)?;
        debug!(provider = name, "provider instance created");
        instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }
}
