//! Terminal output lines and how they are presented.

use std::sync::LazyLock;

use regex::Regex;

use crate::history::Command;

/// Prefix carried by lines that wrap a downloadable link.
pub const LINK_MARKER: &str = "!";
pub const COMMAND_PREFIX: &str = "$";
pub const HEADER_PREFIX: &str = ">";

const LINK_LEAD: &str = "You can download it by clicking this link:";
const LINK_LABEL: &str = "download";

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\s[^>]*?href\s*=\s*["']([^"']*)["']"#).expect("valid href pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Yellow,
    Grey,
    Green,
}

impl Color {
    /// Presentation class name, empty for the default (grey) style.
    pub fn class_name(&self) -> &'static str {
        match self {
            Color::Red => "text-danger",
            Color::Yellow => "text-warning",
            Color::Green => "text-success",
            Color::Grey => "",
        }
    }

    pub fn color32(&self) -> egui::Color32 {
        match self {
            Color::Red => egui::Color32::from_rgb(255, 100, 100),
            Color::Yellow => egui::Color32::from_rgb(255, 200, 100),
            Color::Green => egui::Color32::from_rgb(100, 255, 150),
            Color::Grey => egui::Color32::from_rgb(160, 160, 170),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Plain,
    /// Text holds `<a href>` markup; rendered as wrapper text plus a link.
    LinkWrapped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub timestamp: i64,
    pub color: Color,
    pub is_command: bool,
    pub prefix: String,
    pub kind: LineKind,
}

impl DisplayLine {
    pub fn output(text: impl Into<String>, timestamp: i64, color: Color, prefix: &str) -> Self {
        Self {
            text: text.into(),
            timestamp,
            color,
            is_command: false,
            prefix: prefix.to_string(),
            kind: LineKind::Plain,
        }
    }

    pub fn link(text: impl Into<String>, timestamp: i64, color: Color) -> Self {
        Self {
            kind: LineKind::LinkWrapped,
            ..Self::output(text, timestamp, color, LINK_MARKER)
        }
    }

    /// Echo of a submitted command.
    pub fn echo(command: &Command) -> Self {
        Self {
            text: command.text.clone(),
            timestamp: command.timestamp,
            color: Color::Grey,
            is_command: true,
            prefix: COMMAND_PREFIX.to_string(),
            kind: LineKind::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Text(String),
    Link {
        lead: &'static str,
        label: &'static str,
        href: String,
    },
}

/// A line ready to paint: marker, colour and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub marker: String,
    pub color: Color,
    pub body: RenderedBody,
}

pub fn present(line: &DisplayLine) -> RenderedLine {
    match line.kind {
        LineKind::Plain => RenderedLine {
            marker: line.prefix.clone(),
            color: line.color,
            body: RenderedBody::Text(line.text.clone()),
        },
        LineKind::LinkWrapped => RenderedLine {
            marker: String::new(),
            color: line.color,
            body: RenderedBody::Link {
                lead: LINK_LEAD,
                label: LINK_LABEL,
                href: extract_link_target(&line.text).unwrap_or_default(),
            },
        },
    }
}

/// First `href` of an anchor tag in `markup`.
pub fn extract_link_target(markup: &str) -> Option<String> {
    HREF.captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
