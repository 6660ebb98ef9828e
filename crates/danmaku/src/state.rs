// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `danmaku state`: inspect the persisted watermark and relay settings.

use danmaku_config::DanmakuConfig;
use danmaku_core::{DanmakuError, RelaySettings, StateStore};
use tracing::info;

use crate::app::App;

/// Run the `danmaku state` command.
pub async fn run_state(config: DanmakuConfig, reset_watermark: bool) -> Result<(), DanmakuError> {
    let database_path = config.storage.database_path.clone();
    let app = App::open(config).await?;

    if reset_watermark {
        let removed = app.store.reset_watermark().await?;
        info!(removed, "watermark reset");
    }

    let watermark = app.store.load_watermark().await?;
    let settings = app.store.load_relay_settings().await?;
    app.close().await?;

    for line in render_state(&database_path, watermark, settings.as_ref()) {
        println!("{line}");
    }
    Ok(())
}

fn render_state(database_path: &str, watermark: i64, settings: Option<&RelaySettings>) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "  danmaku state".to_string(),
        format!("  {}", "-".repeat(35)),
        format!("    Database:   {database_path}"),
        format!("    Watermark:  {watermark}"),
    ];

    match settings {
        Some(settings) => {
            lines.push(format!("    Relay:      {}", settings.base_url));
            lines.push(format!("    Key ID:     {}", or_unset(&settings.access_key_id)));
            lines.push(format!("    Key secret: {}", redacted(&settings.access_key_secret)));
            lines.push(format!("    App ID:     {}", or_unset(&settings.app_id)));
            lines.push(format!(
                "    Auth code:  {}",
                redacted(&settings.room_owner_auth_code)
            ));
        }
        None => lines.push("    Relay:      (no stored settings)".to_string()),
    }
    lines.push(String::new());
    lines
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

fn redacted(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { "[REDACTED]" }
}
