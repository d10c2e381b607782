//! Render-and-send entry point for one event and one destination.

use std::time::Duration;

use taskwatch_core::{Config, Event};

use crate::destination::Destination;
use crate::error::NotifyError;
use crate::slack::{SlackMessage, SlackRenderer};
use crate::webhook::SlackWebhook;

/// Renders an event and posts it to a Slack webhook.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    renderer: SlackRenderer,
    webhook: SlackWebhook,
}

impl SlackNotifier {
    pub fn new(renderer: SlackRenderer, webhook: SlackWebhook) -> Self {
        Self { renderer, webhook }
    }

    /// Build from loaded configuration: web URL, state sets and request timeout.
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let timeout = config.slack.timeout_secs.map(Duration::from_secs);
        Ok(Self::new(
            SlackRenderer::from_config(config),
            SlackWebhook::with_timeout(timeout)?,
        ))
    }

    pub fn renderer(&self) -> &SlackRenderer {
        &self.renderer
    }

    pub fn render(&self, app_name: &str, event: &Event, destination: &Destination) -> SlackMessage {
        self.renderer.render(app_name, event, &destination.extra)
    }

    /// Render and send. Delivery failures are logged, never returned.
    pub async fn notify(&self, app_name: &str, event: &Event, destination: &Destination) {
        let message = self.render(app_name, event, destination);
        tracing::debug!(
            app = app_name,
            task = %event.name,
            kind = %event.kind,
            state = %event.state,
            "sending slack notification"
        );
        self.webhook.deliver(&destination.webhook_url, &message).await;
    }

    /// Render and send, returning the delivery outcome.
    pub async fn try_notify(
        &self,
        app_name: &str,
        event: &Event,
        destination: &Destination,
    ) -> Result<(), NotifyError> {
        let message = self.render(app_name, event, destination);
        self.webhook.try_deliver(&destination.webhook_url, &message).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use taskwatch_core::StateClassification;

    use super::*;

    fn notifier() -> SlackNotifier {
        SlackNotifier::new(
            SlackRenderer::new("https://monitor.example.com", StateClassification::default()),
            SlackWebhook::new(),
        )
    }

    fn event() -> Event {
        Event {
            name: "tasks.sync_catalog".into(),
            uuid: "c-9".into(),
            worker: "celery@sync".into(),
            app_env: "prod".into(),
            state: "SUCCEEDED".into(),
            runtime: Some(12.5),
            ..Default::default()
        }
    }

    #[test]
    fn render_uses_destination_note() {
        let destination = Destination::new("https://hooks.slack.test").with_note("nightly run");
        let message = notifier().render("catalog", &event(), &destination);
        let note = message.attachments[0]
            .fields
            .iter()
            .find(|f| f.title == "Note")
            .expect("note field");
        assert_eq!(note.value, "nightly run");
    }

    #[tokio::test]
    async fn try_notify_posts_to_destination() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(200);
        });

        let destination = Destination::new(server.url("/hook"));
        notifier()
            .try_notify("catalog", &event(), &destination)
            .await
            .expect("delivered");
        assert_eq!(hook.calls(), 1);
    }

    #[tokio::test]
    async fn notify_returns_normally_on_failure() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(403).body("invalid_token");
        });

        let destination = Destination::new(server.url("/hook"));
        notifier().notify("catalog", &event(), &destination).await;
        assert_eq!(hook.calls(), 1);
    }

    #[test]
    fn from_config_applies_web_url() {
        let config = Config::for_profile("NOTIFIERTEST").unwrap();
        let notifier = SlackNotifier::from_config(&config).unwrap();
        assert!(notifier
            .renderer()
            .task_link("a", "u")
            .starts_with(&config.web.url));
    }
}
