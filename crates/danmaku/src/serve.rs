// SPDX-FileCopyrightText: 2026 Danmaku Bridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `danmaku serve` command implementation.
//!
//! Opens storage, optionally pushes credentials to the relay, then polls and
//! forwards events until SIGINT or SIGTERM.

use std::time::Duration;

use danmaku_agent::shutdown;
use danmaku_config::DanmakuConfig;
use danmaku_core::DanmakuError;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::App;

/// Runs the `danmaku serve` command.
pub async fn run_serve(config: DanmakuConfig, interval_ms: Option<u64>) -> Result<(), DanmakuError> {
    info!(name = config.agent.name.as_str(), "starting danmaku serve");
    danmaku_agent::metrics::register_metrics();

    let app = App::open(config).await?;
    let cancel = shutdown::install_signal_handler();
    serve_until(&app, interval_ms.map(Duration::from_millis), cancel).await
}

/// Polls until `cancel` fires, then stops the poller and closes storage.
async fn serve_until(
    app: &App,
    interval: Option<Duration>,
    cancel: CancellationToken,
) -> Result<(), DanmakuError> {
    let bridge = app.bridge().await?;

    if app.config.polling.auto_configure && !bridge.configure_and_start_service().await {
        app.close().await?;
        return Err(app.relay_failure());
    }

    bridge.start_polling(interval);
    let watermark = bridge.watermark().await;
    info!(
        watermark,
        base_url = bridge.settings().base_url.as_str(),
        "bridge running, press Ctrl+C to stop"
    );

    cancel.cancelled().await;

    bridge.stop_polling();
    app.close().await?;
    let watermark = bridge.watermark().await;
    info!(watermark, "danmaku serve stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support;
    use danmaku_core::StateStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_configure(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/configure"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn serve_forwards_events_and_persists_watermark() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_configure(&server, 200, serde_json::json!({"status": "success"})).await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"type": "gift", "uname": "Bob", "uid": 2, "room_id": 7,
                 "timestamp": 10, "gift_name": "Rocket", "gift_num": 5},
                {"type": "danmaku", "uname": "Alice", "uid": 1, "room_id": 7,
                 "timestamp": 5, "msg": "hi"}
            ])))
            .mount(&server)
            .await;

        let config = test_support::config(&server.uri(), dir.path());
        let app = App::open(config.clone()).await.unwrap();
        let cancel = CancellationToken::new();
        let stopper = cancel.clone();

        let serving = tokio::spawn(async move {
            serve_until(&app, Some(Duration::from_millis(20)), cancel).await
        });
        tokio::time::sleep(Duration::from_millis(300)).await;
        stopper.cancel();
        serving.await.unwrap().unwrap();

        let reopened = App::open(config).await.unwrap();
        assert_eq!(reopened.store.load_watermark().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn serve_fails_when_relay_rejects_credentials() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        mount_configure(
            &server,
            200,
            serde_json::json!({"status": "error", "message": "invalid auth code"}),
        )
        .await;

        let app = App::open(test_support::config(&server.uri(), dir.path()))
            .await
            .unwrap();
        let err = serve_until(&app, None, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.detail(), "配置弹幕服务失败: invalid auth code");
    }
}
