// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by every subcommand: state store, relay client and bridge.

use std::sync::Arc;
use std::time::Duration;

use danmaku_agent::{ChatStore, DanmakuBridge, Dispatcher, ProviderRegistry};
use danmaku_client::RelayClient;
use danmaku_config::DanmakuConfig;
use danmaku_core::{DanmakuError, EventSource, StateStore};
use danmaku_storage::SqliteStateStore;
use tracing::debug;

/// Opened storage plus a relay client using the effective settings.
pub struct App {
    pub config: DanmakuConfig,
    pub store: Arc<SqliteStateStore>,
    pub client: Arc<RelayClient>,
}

impl App {
    /// Opens the database and builds the relay client.
    ///
    /// The stored settings record wins over `[relay]`; on first run the
    /// record is seeded from `[relay]`.
    pub async fn open(config: DanmakuConfig) -> Result<Self, DanmakuError> {
        let store = Arc::new(SqliteStateStore::new(config.storage.clone()));
        store.initialize().await?;

        let settings = match store.load_relay_settings().await? {
            Some(settings) => settings,
            None => {
                let seeded = config.relay.settings();
                store.save_relay_settings(&seeded).await?;
                debug!("relay settings seeded from configuration");
                seeded
            }
        };

        let timeout = config.relay.request_timeout_ms.map(Duration::from_millis);
        let client = Arc::new(RelayClient::new(settings, timeout)?);

        Ok(Self {
            config,
            store,
            client,
        })
    }

    /// Builds the bridge with the configured transcript and providers.
    pub async fn bridge(&self) -> Result<DanmakuBridge, DanmakuError> {
        let chat = Arc::new(ChatStore::new(
            self.config.chat.system_prompt.clone(),
            self.config.chat.max_history,
        ));
        let registry = Arc::new(ProviderRegistry::from_config(&self.config));
        let dispatcher = Dispatcher::new(chat, registry)
            .with_message_prefix(self.config.relay.message_prefix.clone())
            .with_source_tag(self.config.relay.source_tag.clone());

        let bridge = DanmakuBridge::new(self.client.clone(), self.store.clone(), dispatcher)
            .await?
            .with_default_interval(Duration::from_millis(self.config.polling.interval_ms));
        Ok(bridge)
    }

    /// The relay client's error slot as an error value.
    pub fn relay_failure(&self) -> DanmakuError {
        DanmakuError::relay(
            self.client
                .last_error()
                .unwrap_or_else(|| "relay request failed".to_string()),
        )
    }

    pub async fn close(&self) -> Result<(), DanmakuError> {
        self.store.close().await
    }
}
