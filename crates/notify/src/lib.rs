//! Slack notifications for task-queue monitoring events.
//!
//! This crate provides:
//! - `SlackRenderer`, which turns a task or worker event into Slack attachments
//! - `SlackWebhook`, which posts a rendered message to an incoming webhook
//! - `SlackNotifier`, which does both for one event and one destination

pub mod destination;
pub mod error;
pub mod notifier;
pub mod slack;
pub mod webhook;

pub use destination::{Destination, Extra};
pub use error::NotifyError;
pub use notifier::SlackNotifier;
pub use slack::{color_for, Attachment, Color, Field, SlackMessage, SlackRenderer};
pub use webhook::SlackWebhook;
