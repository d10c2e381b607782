//! Slack incoming-webhook delivery.
//!
//! One POST per message, no retries. [`SlackWebhook::deliver`] is
//! fire-and-forget: failures are logged and swallowed so that a broken
//! webhook never interrupts the caller.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::NotifyError;
use crate::slack::SlackMessage;

/// Posts rendered messages to Slack webhook URLs.
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl SlackWebhook {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build a webhook client with an optional overall request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, NotifyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Post `message` to `url`, reporting transport errors and non-2xx replies.
    pub async fn try_deliver(&self, url: &str, message: &SlackMessage) -> Result<(), NotifyError> {
        let body = serde_json::to_string(message)?;

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(
            %status,
            attachments = message.attachments.len(),
            "slack notification delivered"
        );

        Ok(())
    }

    /// Post `message` to `url`, logging any failure instead of returning it.
    pub async fn deliver(&self, url: &str, message: &SlackMessage) {
        if let Err(e) = self.try_deliver(url, message).await {
            tracing::error!(error = %e, "Request to slack returned an error");
        }
    }
}

impl Default for SlackWebhook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use httpmock::prelude::*;
    use taskwatch_core::{Event, StateClassification};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::*;
    use crate::destination::Extra;
    use crate::slack::SlackRenderer;

    /// Counts events emitted from this crate.
    struct CountingLayer(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountingLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target().starts_with("taskwatch_notify") {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn message() -> SlackMessage {
        let renderer = SlackRenderer::new("http://localhost:8000", StateClassification::default());
        let event = Event {
            name: "tasks.send_invoice".into(),
            uuid: "u-42".into(),
            worker: "celery@billing".into(),
            app_env: "staging".into(),
            state: "FAILURE".into(),
            exception: Some("SMTPError: relay denied".into()),
            ..Default::default()
        };
        renderer.render("billing", &event, &Extra::new())
    }

    #[tokio::test]
    async fn posts_attachments_as_json() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST)
                .path("/services/T000/B000/hook")
                .header("content-type", "application/json")
                .header("accept", "application/json");
            then.status(200).body("ok");
        });

        let webhook = SlackWebhook::new();
        webhook
            .try_deliver(&server.url("/services/T000/B000/hook"), &message())
            .await
            .expect("delivery succeeds");
        assert_eq!(hook.calls(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(404).body("no_service");
        });

        let result = SlackWebhook::new()
            .try_deliver(&server.url("/hook"), &message())
            .await;
        match result.unwrap_err() {
            NotifyError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no_service");
            }
            other => panic!("expected Status error, got: {other:?}"),
        }
        assert_eq!(hook.calls(), 1);
    }

    #[tokio::test]
    async fn deliver_swallows_non_success_status() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(500).body("internal");
        });

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountingLayer(count.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        SlackWebhook::new().deliver(&server.url("/hook"), &message()).await;

        assert_eq!(hook.calls(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deliver_to_unreachable_url_logs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountingLayer(count.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let webhook = SlackWebhook::with_timeout(Some(Duration::from_secs(5))).unwrap();
        webhook.deliver("http://127.0.0.1:9/hook", &message()).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn try_deliver_to_unreachable_url_is_http_error() {
        let result = SlackWebhook::new()
            .try_deliver("http://127.0.0.1:9/hook", &message())
            .await;
        assert!(matches!(result, Err(NotifyError::Http(_))));
    }
}
