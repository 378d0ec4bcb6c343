//! Maps a submitted command line to output lines and a side effect.

use crate::display::{Color, DisplayLine, HEADER_PREFIX};

pub const UNKNOWN_COMMAND_MESSAGE: &str = "Unknown command. Try typing *help*";
pub const DEFAULT_CHARACTER_CLASS: &str = "random";
pub const CV_PATH: &str = "/cv.pdf";

const HELP: &[&str] = &[
    "List of commands",
    "help - this help",
    "clear - clear screen and history",
    "about - about this app",
    "cv - get my cv",
    "avatar [class] - generate dnd avatar with DALL·E 2",
];

const ABOUT: &[&str] = &[
    "About this programm",
    "",
    "Build in May 2022",
    "In Haifa, Israel",
    "",
    "Tech used:",
    "***",
    "T3 Stack",
    "TRPC",
    "PRISMA",
    "DAISY",
    "DALL-E 2",
    "REACT",
    "ChatGPT",
    "Sweat and tears",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Clear,
    GenerateAvatar { character_class: String },
    UnknownCommand { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub lines: Vec<DisplayLine>,
    pub effect: Effect,
}

impl Interpretation {
    fn lines(lines: Vec<DisplayLine>) -> Self {
        Self {
            lines,
            effect: Effect::None,
        }
    }
}

/// Interpret a trimmed, non-empty command line.
pub fn interpret(input: &str, timestamp: i64) -> Interpretation {
    match input {
        "help" => Interpretation::lines(help(timestamp)),
        "clear" => Interpretation {
            lines: Vec::new(),
            effect: Effect::Clear,
        },
        "about" => Interpretation::lines(about(timestamp)),
        "cv" => Interpretation::lines(cv(timestamp)),
        _ if input.starts_with("avatar") => {
            let character_class = parse_character_class(input);
            Interpretation {
                lines: avatar(&character_class, timestamp),
                effect: Effect::GenerateAvatar { character_class },
            }
        }
        _ => Interpretation {
            lines: Vec::new(),
            effect: Effect::UnknownCommand {
                message: UNKNOWN_COMMAND_MESSAGE.to_string(),
            },
        },
    }
}

/// Second whitespace-separated token, or `random`.
pub fn parse_character_class(input: &str) -> String {
    input
        .split_whitespace()
        .nth(1)
        .unwrap_or(DEFAULT_CHARACTER_CLASS)
        .to_string()
}

fn header_prefix(i: usize) -> &'static str {
    if i == 0 {
        HEADER_PREFIX
    } else {
        ""
    }
}

fn help(timestamp: i64) -> Vec<DisplayLine> {
    HELP.iter()
        .enumerate()
        .map(|(i, text)| DisplayLine::output(*text, timestamp, Color::Yellow, header_prefix(i)))
        .collect()
}

fn about(timestamp: i64) -> Vec<DisplayLine> {
    ABOUT
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let color = if (1..=3).contains(&i) {
                Color::Green
            } else {
                Color::Yellow
            };
            DisplayLine::output(*text, timestamp, color, header_prefix(i))
        })
        .collect()
}

fn cv(timestamp: i64) -> Vec<DisplayLine> {
    vec![
        DisplayLine::output("My CV", timestamp, Color::Yellow, HEADER_PREFIX),
        DisplayLine::link(
            format!(r#"you can download it from <a href="{}" target="blank">here</a>"#, CV_PATH),
            timestamp,
            Color::Yellow,
        ),
    ]
}

fn avatar(character_class: &str, timestamp: i64) -> Vec<DisplayLine> {
    vec![
        DisplayLine::output("Generate DnD avatar", timestamp, Color::Yellow, HEADER_PREFIX),
        DisplayLine::output(
            format!("For class: {}", character_class),
            timestamp,
            Color::Yellow,
            HEADER_PREFIX,
        ),
        DisplayLine::output("generating...", timestamp, Color::Yellow, ""),
    ]
}
