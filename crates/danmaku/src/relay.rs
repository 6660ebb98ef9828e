// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot relay commands: `status`, `configure`, `stop` and `fetch`.

use std::io::IsTerminal;

use clap::Args;
use danmaku_agent::format_content;
use danmaku_config::DanmakuConfig;
use danmaku_core::{DanmakuError, DanmakuEvent, RelaySettings, ServiceStatus};
use serde::Serialize;

use crate::app::App;

/// Flags merged into the stored relay settings by `danmaku configure`.
#[derive(Args, Debug, Default)]
pub struct ConfigureArgs {
    /// Relay base URL, e.g. http://localhost:12346/
    #[arg(long)]
    pub base_url: Option<String>,
    #[arg(long)]
    pub access_key_id: Option<String>,
    #[arg(long)]
    pub access_key_secret: Option<String>,
    #[arg(long)]
    pub app_id: Option<String>,
    #[arg(long)]
    pub room_owner_auth_code: Option<String>,
}

impl ConfigureArgs {
    /// Overwrites the fields that were given on the command line.
    fn apply(self, settings: &mut RelaySettings) {
        let fields = [
            (self.base_url, &mut settings.base_url),
            (self.access_key_id, &mut settings.access_key_id),
            (self.access_key_secret, &mut settings.access_key_secret),
            (self.app_id, &mut settings.app_id),
            (self.room_owner_auth_code, &mut settings.room_owner_auth_code),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub base_url: String,
    pub running: bool,
    pub message_count: u64,
}

/// Run `danmaku status`.
pub async fn run_status(config: DanmakuConfig, json: bool) -> Result<(), DanmakuError> {
    let app = App::open(config).await?;
    let bridge = app.bridge().await?;
    let status = bridge.service_status().await;
    app.close().await?;

    let status = status.ok_or_else(|| app.relay_failure())?;
    let output = StatusOutput {
        base_url: bridge.settings().base_url,
        running: status.running,
        message_count: status.message_count,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_status(&output.base_url, status, std::io::stdout().is_terminal());
    }
    Ok(())
}

/// Run `danmaku configure`: persist the merged settings, then push them.
pub async fn run_configure(config: DanmakuConfig, args: ConfigureArgs) -> Result<(), DanmakuError> {
    let app = App::open(config).await?;
    let bridge = app.bridge().await?;

    let mut settings = bridge.settings();
    args.apply(&mut settings);
    if !danmaku_config::validation::is_http_url(&settings.base_url) {
        app.close().await?;
        return Err(DanmakuError::Config(format!(
            "base URL `{}` must be an http:// or https:// URL",
            settings.base_url
        )));
    }
    bridge.update_settings(settings).await?;

    let ok = bridge.configure_and_start_service().await;
    app.close().await?;
    if !ok {
        return Err(app.relay_failure());
    }
    println!("relay configured ({})", bridge.settings().base_url);
    Ok(())
}

/// Run `danmaku stop`.
pub async fn run_stop(config: DanmakuConfig) -> Result<(), DanmakuError> {
    let app = App::open(config).await?;
    let bridge = app.bridge().await?;
    let ok = bridge.stop_service().await;
    app.close().await?;

    if !ok {
        return Err(app.relay_failure());
    }
    println!("relay stopped");
    Ok(())
}

/// Run `danmaku fetch`. Nothing is forwarded and the watermark is untouched.
pub async fn run_fetch(config: DanmakuConfig, json: bool) -> Result<(), DanmakuError> {
    let app = App::open(config).await?;
    let bridge = app.bridge().await?;
    let events = bridge.fetch_messages().await;
    app.close().await?;

    let events = events.ok_or_else(|| app.relay_failure())?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&events).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if events.is_empty() {
        println!("no pending events");
    }
    for event in &events {
        println!("{}", describe_event(event));
    }
    Ok(())
}

/// `[HH:MM:SS] tag uname: content`, with local time when the timestamp is valid.
fn describe_event(event: &DanmakuEvent) -> String {
    let time = chrono::DateTime::from_timestamp(event.timestamp, 0)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| event.timestamp.to_string());
    format!(
        "[{time}] {} {}: {}",
        event.kind.tag(),
        event.uname,
        format_content(&event.kind)
    )
}

fn print_status(base_url: &str, status: ServiceStatus, use_color: bool) {
    println!();
    println!("  danmaku relay");
    println!("  {}", "-".repeat(35));

    let state = if status.running { "running" } else { "stopped" };
    if use_color {
        use colored::Colorize;
        let state = if status.running {
            format!("{} {}", "✓".green(), state.green())
        } else {
            format!("{} {}", "✗".yellow(), state.yellow())
        };
        println!("    State:    {state}");
    } else {
        let mark = if status.running { "[OK]" } else { "[--]" };
        println!("    State:    {mark} {state}");
    }

    println!("    Pending:  {}", status.message_count);
    println!("    Endpoint: {base_url}");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support;
    use danmaku_core::StateStore;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn relay() -> (MockServer, tempfile::TempDir) {
        (MockServer::start().await, tempfile::tempdir().unwrap())
    }

    #[test]
    fn configure_args_override_only_given_fields() {
        let mut settings = RelaySettings {
            access_key_id: "old-id".to_string(),
            app_id: "1".to_string(),
            ..RelaySettings::default()
        };
        ConfigureArgs {
            app_id: Some("2".to_string()),
            ..ConfigureArgs::default()
        }
        .apply(&mut settings);
        assert_eq!(settings.access_key_id, "old-id");
        assert_eq!(settings.app_id, "2");
    }

    #[test]
    fn describes_event_with_formatted_content() {
        let event: DanmakuEvent = serde_json::from_value(serde_json::json!({
            "type": "gift", "uname": "Bob", "uid": 1, "room_id": 2,
            "timestamp": 10, "gift_name": "Rocket", "gift_num": 5
        }))
        .unwrap();
        let line = describe_event(&event);
        assert!(line.ends_with("gift Bob: 赠送 Rocket x5"));
    }

    #[test]
    fn status_output_serializes() {
        let output = StatusOutput {
            base_url: "http://localhost:12346/".to_string(),
            running: true,
            message_count: 3,
        };
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"running\":true"));
        assert!(json.contains("\"message_count\":3"));
    }

    #[tokio::test]
    async fn status_reports_relay_state() {
        let (server, dir) = relay().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"running": true, "message_count": 4})),
            )
            .expect(1)
            .mount(&server)
            .await;

        run_status(test_support::config(&server.uri(), dir.path()), true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unreachable_relay_fails_with_error_slot() {
        let (server, dir) = relay().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = run_status(test_support::config(&server.uri(), dir.path()), false)
            .await
            .unwrap_err();
        assert!(err.detail().starts_with("获取弹幕服务状态失败"));
        assert!(err.detail().contains("HTTP error! status: 503"));
    }

    #[tokio::test]
    async fn configure_persists_flags_and_posts_credentials() {
        let (server, dir) = relay().await;
        Mock::given(method("POST"))
            .and(path("/configure"))
            .and(body_json(serde_json::json!({
                "ACCESS_KEY_ID": "key-id",
                "ACCESS_KEY_SECRET": "key-secret",
                "APP_ID": "42",
                "ROOM_OWNER_AUTH_CODE": "AUTH"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = test_support::config(&server.uri(), dir.path());
        let args = ConfigureArgs {
            app_id: Some("42".to_string()),
            ..ConfigureArgs::default()
        };
        run_configure(config.clone(), args).await.unwrap();

        let app = App::open(config).await.unwrap();
        let stored = app.store.load_relay_settings().await.unwrap().unwrap();
        assert_eq!(stored.app_id, "42");
    }

    #[tokio::test]
    async fn configure_rejection_surfaces_relay_error() {
        let (server, dir) = relay().await;
        Mock::given(method("POST"))
            .and(path("/configure"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "bad key"})),
            )
            .mount(&server)
            .await;

        let err = run_configure(
            test_support::config(&server.uri(), dir.path()),
            ConfigureArgs::default(),
        )
        .await
        .unwrap_err();
        assert!(err.detail().contains("bad key"));
    }

    #[tokio::test]
    async fn configure_rejects_non_http_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let args = ConfigureArgs {
            base_url: Some("ftp://relay".to_string()),
            ..ConfigureArgs::default()
        };
        let config = test_support::config("http://127.0.0.1:1/", dir.path());
        let err = run_configure(config.clone(), args).await.unwrap_err();
        assert!(matches!(err, DanmakuError::Config(_)));

        let app = App::open(config).await.unwrap();
        let stored = app.store.load_relay_settings().await.unwrap().unwrap();
        assert_eq!(stored.base_url, "http://127.0.0.1:1/");
        app.close().await.unwrap();
    }

    #[tokio::test]
    async fn stop_and_fetch_hit_their_endpoints() {
        let (server, dir) = relay().await;
        Mock::given(method("POST"))
            .and(path("/stop"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"type": "danmaku", "uname": "A", "uid": 1, "room_id": 2, "timestamp": 5, "msg": "hi"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_support::config(&server.uri(), dir.path());
        run_stop(config.clone()).await.unwrap();
        run_fetch(config.clone(), false).await.unwrap();

        let app = App::open(config).await.unwrap();
        assert_eq!(app.store.load_watermark().await.unwrap(), 0);
    }
}
