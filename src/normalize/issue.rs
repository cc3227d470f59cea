//! GitHub issue receipt layout.

use chrono::FixedOffset;

use super::sanitize::{sanitize_body, single_line};
use super::{EMPTY_BODY, FOOTER, NONE, field, format_timestamp, line};
use crate::event::IssueEvent;
use crate::ir::{Block, Program, StyleChange};
use crate::protocol::graphics::Density;
use crate::protocol::text::Alignment;
use crate::render::RasterImage;

/// Lay out an issue. `logo` and `avatar` are already rasterized (or absent).
pub fn blocks(
    issue: &IssueEvent,
    offset: &FixedOffset,
    logo: Option<RasterImage>,
    avatar: Option<RasterImage>,
) -> Program {
    let repository = field(issue.repository().as_deref());
    let number = issue
        .number
        .map(|n| format!("#{}", n))
        .unwrap_or_else(|| NONE.to_string());
    let title = field(issue.title.as_deref());
    let author = field(issue.user.as_ref().and_then(|u| u.login.as_deref()));
    let assignee = field(issue.assignee.as_ref().and_then(|u| u.login.as_deref()));
    let body = match issue.body.as_deref().map(sanitize_body) {
        Some(body) if !body.is_empty() => body,
        _ => EMPTY_BODY.to_string(),
    };

    let mut program = Program::new();
    program.push(Block::Style(StyleChange::new().align(Alignment::Center)));

    if let Some(logo) = logo {
        program.push(Block::Image {
            raster: logo,
            density: Density::D24,
        });
        program.push(Block::Feed);
    }

    // Header
    program.extend([
        Block::Style(StyleChange::headline()),
        line(format!("{} 새이슈!", repository)),
        Block::Style(StyleChange::new().scale(1, 1)),
        Block::Rule,
        Block::Feed,
    ]);

    // Metadata
    program.extend([
        Block::Style(StyleChange::new().align(Alignment::Left).bold(true)),
        line(format!("저장소: {}", repository)),
        line(format!("번  호: {}", number)),
        line(format!("제  목: {}", title)),
        Block::Feed,
        Block::Style(StyleChange::normal()),
        line(format!("작성자: {}", author)),
        line(format!("작성일: {}", format_timestamp(issue.created_at, offset))),
        line(format!("담당자: {}", assignee)),
    ]);

    match avatar {
        Some(raster) => program.push(Block::Image {
            raster,
            density: Density::D24,
        }),
        None => program.push(Block::Feed),
    }

    program.extend([Block::Rule, Block::Feed, Block::Style(StyleChange::normal()), Block::text(body)]);

    let url = issue.html_url.as_deref().map(single_line).filter(|u| !u.is_empty());
    if let Some(url) = url {
        program.extend([
            Block::Style(StyleChange::new().align(Alignment::Center)),
            Block::qr(url.clone()),
            Block::Style(StyleChange::new().align(Alignment::Left)),
            line(url),
            Block::Feed,
        ]);
    }

    program.extend([Block::Rule, Block::text(FOOTER), Block::Feed, Block::Cut]);
    program
}
