//! Todo note receipt layout.

use chrono::FixedOffset;

use super::sanitize::{BODY_LIMIT, clean, collapse_newlines, extract_tags, remove_tags, truncate};
use super::{EMPTY_BODY, field, format_timestamp, line};
use crate::event::TodoEvent;
use crate::ir::{Block, Program, StyleChange};
use crate::protocol::text::Alignment;

/// Line spacing (motion units) for the oversized body text.
pub const BODY_LINE_SPACING: u8 = 140;

/// Tags found in the body and the body with them removed.
pub fn split_tags(body: &str) -> (Vec<String>, String) {
    let cleaned = clean(body);
    let tags = extract_tags(&cleaned);
    let stripped = collapse_newlines(remove_tags(&cleaned).trim());
    (tags, stripped)
}

/// Lay out a todo note.
pub fn blocks(todo: &TodoEvent, offset: &FixedOffset) -> Program {
    let title = field(todo.title.as_deref());
    let author = field(todo.user.as_deref());
    let (tags, body) = split_tags(todo.body.as_deref().unwrap_or_default());
    let body = if body.is_empty() {
        EMPTY_BODY.to_string()
    } else {
        truncate(&body, BODY_LIMIT)
    };

    let mut program = Program::new();
    program.extend([
        Block::Style(StyleChange::headline()),
        line(format!("{} ›", title)),
        Block::Feed,
    ]);

    if !tags.is_empty() {
        program.extend([
            Block::Style(StyleChange::new().align(Alignment::Left).scale(1, 1)),
            line(format!("프로젝트: {}", tags.join(", "))),
        ]);
    }

    program.extend([
        Block::Style(StyleChange::normal().align(Alignment::Left)),
        line(format!("작성자: {}", author)),
        line(format!("작성일: {}", format_timestamp(todo.created_at, offset))),
        Block::Rule,
        Block::Feed,
        Block::Style(StyleChange::new().scale(2, 2).line_spacing(BODY_LINE_SPACING)),
        Block::text(body),
        Block::Style(StyleChange::new().line_spacing(0)),
        Block::Feed,
        Block::Feed,
        Block::Cut,
    ]);

    program
}
