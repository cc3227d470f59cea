//! # Print Events
//!
//! Inbound notifications that become receipts. The structs mirror the JSON
//! the webhooks deliver (GitHub's `issue` object, the todo app's `issue`
//! object, the screenshot uploader's `image` object), with every field
//! optional so partially-populated payloads still print.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::InkslipError;

/// A notification to print.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintEvent {
    Issue(IssueEvent),
    Todo(TodoEvent),
    RawImage(ImageEvent),
}

impl PrintEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PrintEvent::Issue(_) => "issue",
            PrintEvent::Todo(_) => "todo",
            PrintEvent::RawImage(_) => "image",
        }
    }

    /// Title line, if the event has one.
    pub fn title(&self) -> Option<&str> {
        match self {
            PrintEvent::Issue(issue) => issue.title.as_deref(),
            PrintEvent::Todo(todo) => todo.title.as_deref(),
            PrintEvent::RawImage(image) => image.title.as_deref(),
        }
    }
}

/// Which event a bare JSON object describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Issue,
    Todo,
    Image,
}

impl EventKind {
    /// Parse a bare event object (the `issue` or `image` member of a
    /// webhook payload).
    pub fn parse(self, json: &str) -> Result<PrintEvent, InkslipError> {
        let malformed = |e: serde_json::Error| InkslipError::MalformedEvent(e.to_string());
        Ok(match self {
            EventKind::Issue => PrintEvent::Issue(serde_json::from_str(json).map_err(malformed)?),
            EventKind::Todo => PrintEvent::Todo(serde_json::from_str(json).map_err(malformed)?),
            EventKind::Image => PrintEvent::RawImage(serde_json::from_str(json).map_err(malformed)?),
        })
    }
}

/// A GitHub user reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A GitHub issue (`payload.issue` of an `issues` webhook).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub repository_url: Option<String>,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl IssueEvent {
    /// `owner/name`, taken from the last two segments of `repository_url`.
    pub fn repository(&self) -> Option<String> {
        let url = self.repository_url.as_deref()?.trim_end_matches('/');
        let mut segments = url.rsplit('/').filter(|s| !s.is_empty());
        let name = segments.next()?;
        match segments.next() {
            Some(owner) => Some(format!("{}/{}", owner, name)),
            None => Some(name.to_string()),
        }
    }
}

/// A todo note (`payload.issue` of the todo webhook). `user` is a plain name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TodoEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An uploaded image (`payload.image` of the image webhook).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageEvent {
    #[serde(default)]
    pub title: Option<String>,
    /// Base64 bitmap, optionally as a `data:image/...;base64,` URL.
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// RFC 3339 timestamp, or `None` for anything unparsable.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}
