//! Slack attachment rendering for task and worker events.
//!
//! Turns one [`Event`] into the `attachments` payload accepted by Slack
//! incoming webhooks: a main attachment with the event's fields, plus a
//! traceback attachment when the event carries one.

use serde::Serialize;
use taskwatch_core::states::StateClass;
use taskwatch_core::{Config, Event, StateClassification};

use crate::destination::{note_from, Extra};

/// Longest argument text shown before truncation, in characters.
pub const MAX_ARGUMENT_CHARS: usize = 500;
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Argument renderings that carry no information.
const EMPTY_ARGUMENT_MARKERS: &[&str] = &["()", "[]", "{}", "None", "null"];

/// Tracebacks longer than this get an error excerpt ahead of the full text.
const TRACEBACK_PREVIEW_THRESHOLD: usize = 10;
/// Raw lines inspected from the end when looking for the error excerpt.
const EXCERPT_SCAN_WINDOW: usize = 3;
const EXCERPT_MAX_LINES: usize = 3;
const SEPARATOR_WIDTH: usize = 40;

/// Attachment colour strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    #[serde(rename = "danger")]
    Danger,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "#36C5F0")]
    Info,
    #[serde(rename = "yellow")]
    Pending,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Danger => "danger",
            Color::Good => "good",
            Color::Info => "#36C5F0",
            Color::Pending => "yellow",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a state label to its attachment colour.
pub fn color_for(states: &StateClassification, state: &str) -> Color {
    match states.classify(state) {
        StateClass::Exception => Color::Danger,
        StateClass::Success => Color::Good,
        StateClass::Unready => Color::Info,
        StateClass::Other => Color::Pending,
    }
}

/// One titled value inside an attachment. `short` fields share a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub color: Color,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The webhook request body: `{"attachments": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    pub attachments: Vec<Attachment>,
}

impl SlackMessage {
    pub fn main(&self) -> Option<&Attachment> {
        self.attachments.first()
    }

    pub fn traceback(&self) -> Option<&Attachment> {
        self.attachments.get(1)
    }
}

/// Ordered field list. Each `*_opt` call appends only when a value is present.
#[derive(Debug, Default)]
struct FieldsBuilder {
    fields: Vec<Field>,
}

impl FieldsBuilder {
    fn push(mut self, title: &str, value: impl Into<String>, short: bool) -> Self {
        self.fields.push(Field {
            title: title.to_string(),
            value: value.into(),
            short,
        });
        self
    }

    fn short(self, title: &str, value: impl Into<String>) -> Self {
        self.push(title, value, true)
    }

    fn wide(self, title: &str, value: impl Into<String>) -> Self {
        self.push(title, value, false)
    }

    fn short_opt(self, title: &str, value: Option<String>) -> Self {
        match value {
            Some(v) => self.short(title, v),
            None => self,
        }
    }

    fn wide_opt(self, title: &str, value: Option<String>) -> Self {
        match value {
            Some(v) => self.wide(title, v),
            None => self,
        }
    }

    fn build(self) -> Vec<Field> {
        self.fields
    }
}

/// Renders events into Slack messages.
///
/// Holds the web UI base URL used for title links and the state sets used
/// for colouring. Both are fixed at construction.
#[derive(Debug, Clone)]
pub struct SlackRenderer {
    web_url: String,
    states: StateClassification,
}

impl SlackRenderer {
    pub fn new(web_url: impl Into<String>, states: StateClassification) -> Self {
        let web_url: String = web_url.into();
        Self {
            web_url: web_url.trim_end_matches('/').to_string(),
            states,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.web.url.clone(), config.states.clone())
    }

    pub fn states(&self) -> &StateClassification {
        &self.states
    }

    pub fn color_for(&self, state: &str) -> Color {
        color_for(&self.states, state)
    }

    /// Link to the event's detail page in the web UI.
    pub fn task_link(&self, app_name: &str, uuid: &str) -> String {
        format!("{}/task?app={}&uuid={}", self.web_url, app_name, uuid)
    }

    pub fn render(&self, app_name: &str, event: &Event, extra: &Extra) -> SlackMessage {
        let color = self.color_for(&event.state);

        let fields = FieldsBuilder::default()
            .short("Application", app_name)
            .short("Environment", event.app_env.as_str())
            .short("Task worker", event.worker.as_str())
            .short("Task state", event.state.as_str())
            .wide("Task uuid", event.uuid.as_str())
            .wide_opt("Exception", non_empty(event.exception.as_deref()))
            .short_opt("Runtime", runtime_text(event.runtime))
            .short_opt("Queue", non_empty(event.queue.as_deref()))
            .short_opt("Retries", event.retries.map(|r| r.to_string()))
            .wide_opt("Arguments", argument_block(event.args.as_deref()))
            .wide_opt("Keyword Arguments", argument_block(event.kwargs.as_deref()))
            .wide_opt("Note", note_from(extra))
            .build();

        let mut attachments = vec![Attachment {
            color,
            title: format!("Task: {}", event.name),
            title_link: Some(self.task_link(app_name, &event.uuid)),
            fields,
            text: None,
        }];

        if let Some(traceback) = event.traceback.as_deref().filter(|t| !t.is_empty()) {
            attachments.push(Attachment {
                color,
                title: "Traceback".to_string(),
                title_link: None,
                fields: Vec::new(),
                text: Some(code_block(&summarize_traceback(traceback))),
            });
        }

        SlackMessage { attachments }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn runtime_text(runtime: Option<f64>) -> Option<String> {
    runtime
        .filter(|r| *r != 0.0)
        .map(|r| format!("{r:.2} seconds"))
}

fn code_block(text: &str) -> String {
    format!("```\n{text}\n```")
}

/// Render argument text as a code block, or `None` when it says nothing.
pub fn argument_block(raw: Option<&str>) -> Option<String> {
    let text = raw?.trim();
    if text.is_empty() || EMPTY_ARGUMENT_MARKERS.contains(&text) {
        return None;
    }
    Some(code_block(&truncate_chars(text, MAX_ARGUMENT_CHARS)))
}

/// Keep the first `limit` characters, appending [`TRUNCATION_MARKER`] if anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Lay out a traceback so the error itself comes first.
///
/// Slack collapses long attachment text behind "Show more" after roughly
/// 440 characters, so long tracebacks lead with their last non-blank lines.
/// Tracebacks of up to ten lines are returned unchanged.
pub fn summarize_traceback(traceback: &str) -> String {
    let lines: Vec<&str> = traceback.trim().split('\n').collect();
    if lines.len() <= TRACEBACK_PREVIEW_THRESHOLD {
        return traceback.to_string();
    }

    format!(
        "{}\n\n{}\n\nFull traceback:\n{}",
        error_excerpt(&lines).join("\n"),
        "─".repeat(SEPARATOR_WIDTH),
        lines.join("\n")
    )
}

/// Up to three non-blank lines from the last three raw lines, in original order.
fn error_excerpt<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut excerpt: Vec<&str> = lines
        .iter()
        .rev()
        .take(EXCERPT_SCAN_WINDOW)
        .filter(|line| !line.trim().is_empty())
        .take(EXCERPT_MAX_LINES)
        .copied()
        .collect();
    excerpt.reverse();
    excerpt
}
