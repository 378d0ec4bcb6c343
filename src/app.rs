use eframe::egui;
use std::time::{Duration, Instant};

use crate::avatar::AvatarSource;
use crate::config::AppConfig;
use crate::display::{present, RenderedBody, RenderedLine};
use crate::history::Direction;
use crate::terminal::Terminal;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(12, 12, 20);
const FONT_SIZE: f32 = 16.0;
const AVATAR_SIZE: f32 = 96.0;

/// What the avatar badge shows this frame.
#[derive(Debug, PartialEq, Eq)]
enum AvatarBadge {
    Portrait(String),
    Generating,
    Empty,
}

impl AvatarBadge {
    fn new(source: AvatarSource, loading: bool) -> Self {
        match source {
            AvatarSource::Url(url) => Self::Portrait(url),
            AvatarSource::Placeholder if loading => Self::Generating,
            AvatarSource::Placeholder => Self::Empty,
        }
    }
}

/// Single-line editor behind the `$` prompt. The cursor counts chars.
#[derive(Debug, Default)]
pub struct InputLine {
    buffer: String,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn set(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.buffer = text;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, text: &str) {
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            let at = self.byte_index(self.cursor);
            self.buffer.insert(at, ch);
            self.cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.buffer.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let at = self.byte_index(self.cursor);
            self.buffer.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Buffer with a block cursor drawn in.
    pub fn with_cursor(&self, show_cursor: bool) -> String {
        let mut display = self.buffer.clone();
        if show_cursor {
            display.insert(self.byte_index(self.cursor), '█');
        }
        display
    }
}

pub struct TerminalApp {
    terminal: Terminal,
    config: AppConfig,
    input: InputLine,
    show_cursor: bool,
    last_cursor_blink: Instant,
    _runtime: tokio::runtime::Runtime,
}

impl TerminalApp {
    pub fn new(terminal: Terminal, config: AppConfig, runtime: tokio::runtime::Runtime) -> Self {
        Self {
            terminal,
            config,
            input: InputLine::default(),
            show_cursor: true,
            last_cursor_blink: Instant::now(),
            _runtime: runtime,
        }
    }

    fn handle_key(&mut self, key: egui::Key) {
        match key {
            egui::Key::Enter => {
                let command = self.input.take();
                self.terminal.submit(&command, Instant::now());
            }
            egui::Key::Backspace => self.input.backspace(),
            egui::Key::Delete => self.input.delete(),
            egui::Key::ArrowLeft => self.input.left(),
            egui::Key::ArrowRight => self.input.right(),
            egui::Key::Home => self.input.home(),
            egui::Key::End => self.input.end(),
            egui::Key::ArrowUp => {
                if let Some(text) = self.terminal.navigate(Direction::Older) {
                    self.input.set(text);
                }
            }
            egui::Key::ArrowDown => {
                if let Some(text) = self.terminal.navigate(Direction::Newer) {
                    self.input.set(text);
                }
            }
            egui::Key::Escape => {
                self.input.take();
            }
            _ => {}
        }
    }

    fn paint_line(&self, ui: &mut egui::Ui, line: &RenderedLine) {
        let color = line.color.color32();
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("{:<2}", line.marker))
                    .font(egui::FontId::monospace(FONT_SIZE))
                    .color(egui::Color32::from_rgb(100, 255, 150)),
            );
            match &line.body {
                RenderedBody::Text(text) => {
                    ui.label(
                        egui::RichText::new(text)
                            .font(egui::FontId::monospace(FONT_SIZE))
                            .color(color),
                    );
                }
                RenderedBody::Link { lead, label, href } => {
                    ui.label(
                        egui::RichText::new(*lead)
                            .font(egui::FontId::monospace(FONT_SIZE))
                            .color(color),
                    );
                    ui.add(
                        egui::Hyperlink::from_label_and_url(
                            egui::RichText::new(*label).font(egui::FontId::monospace(FONT_SIZE)),
                            self.config.resolve_link(href),
                        )
                        .open_in_new_tab(true),
                    );
                }
            }
        });
    }

    fn paint_avatar(&self, ui: &mut egui::Ui) {
        let badge = AvatarBadge::new(self.terminal.avatar_source(), self.terminal.loading());
        let size = egui::vec2(AVATAR_SIZE, AVATAR_SIZE);

        egui::Frame::none()
            .fill(egui::Color32::from_rgb(30, 30, 40))
            .inner_margin(egui::Margin::same(4.0))
            .rounding(egui::Rounding::same(6.0))
            .show(ui, |ui| match badge {
                AvatarBadge::Portrait(url) => {
                    let response = ui
                        .add(
                            egui::Image::from_uri(url.clone())
                                .fit_to_exact_size(size)
                                .rounding(egui::Rounding::same(4.0))
                                .sense(egui::Sense::click()),
                        )
                        .on_hover_text(url.as_str());
                    if response.clicked() {
                        ui.ctx().open_url(egui::OpenUrl::new_tab(url));
                    }
                }
                AvatarBadge::Generating => {
                    ui.allocate_ui(size, |ui| {
                        ui.centered_and_justified(|ui| {
                            ui.add(egui::Spinner::new().size(AVATAR_SIZE / 3.0));
                        });
                    });
                }
                AvatarBadge::Empty => {
                    ui.allocate_ui(size, |ui| {
                        ui.centered_and_justified(|ui| {
                            ui.small("no avatar yet");
                        });
                    });
                }
            });
    }
}

impl eframe::App for TerminalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if self.last_cursor_blink.elapsed() > Duration::from_millis(500) {
            self.show_cursor = !self.show_cursor;
            self.last_cursor_blink = now;
        }
        ctx.request_repaint_after(Duration::from_millis(500));

        if self.terminal.poll() > 0 {
            ctx.request_repaint();
        }
        if self.terminal.loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        if let Some(left) = self.terminal.toast_remaining(now) {
            ctx.request_repaint_after(left);
        }

        ctx.input(|i| {
            for event in &i.events {
                match event {
                    egui::Event::Key { key, pressed: true, .. } => self.handle_key(*key),
                    egui::Event::Text(text) => self.input.insert(text),
                    _ => {}
                }
            }
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(BACKGROUND)
                    .inner_margin(egui::Margin::same(12.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.heading(egui::RichText::new("Start with typing *help*").color(egui::Color32::from_rgb(220, 220, 220)));
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                self.paint_avatar(ui);
                            });
                        });
                        ui.separator();

                        egui::ScrollArea::vertical()
                            .stick_to_bottom(true)
                            .auto_shrink([false, false])
                            .show(ui, |ui| {
                                for line in self.terminal.visible_lines() {
                                    self.paint_line(ui, &present(line));
                                }

                                ui.horizontal(|ui| {
                                    ui.label(
                                        egui::RichText::new("$ ")
                                            .font(egui::FontId::monospace(FONT_SIZE))
                                            .color(egui::Color32::from_rgb(100, 255, 150)),
                                    );
                                    ui.label(
                                        egui::RichText::new(self.input.with_cursor(self.show_cursor))
                                            .font(egui::FontId::monospace(FONT_SIZE))
                                            .color(egui::Color32::WHITE),
                                    );
                                });
                            });
                    });
            });

        if let Some(toast) = self.terminal.toast(now) {
            egui::Area::new(egui::Id::new("toast"))
                .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.label(egui::RichText::new(&toast.text).color(egui::Color32::from_rgb(100, 200, 255)));
                    });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_handles_multibyte_chars() {
        let mut input = InputLine::default();
        input.insert("avatar é");
        input.left();
        input.insert("x");
        assert_eq!(input.text(), "avatar xé");

        input.end();
        input.backspace();
        assert_eq!(input.text(), "avatar x");

        input.home();
        input.delete();
        assert_eq!(input.text(), "vatar x");
    }

    #[test]
    fn cursor_is_drawn_at_position() {
        let mut input = InputLine::default();
        input.set("cv".to_string());
        assert_eq!(input.with_cursor(true), "cv█");
        input.home();
        assert_eq!(input.with_cursor(true), "█cv");
        assert_eq!(input.with_cursor(false), "cv");
    }

    #[test]
    fn take_clears_buffer() {
        let mut input = InputLine::default();
        input.insert("help");
        assert_eq!(input.take(), "help");
        assert_eq!(input.text(), "");
        assert_eq!(input.with_cursor(true), "█");
    }

    #[test]
    fn avatar_badge_follows_source() {
        let url = "https://img/a.png".to_string();
        assert_eq!(
            AvatarBadge::new(AvatarSource::Url(url.clone()), false),
            AvatarBadge::Portrait(url)
        );
        assert_eq!(AvatarBadge::new(AvatarSource::Placeholder, true), AvatarBadge::Generating);
        assert_eq!(AvatarBadge::new(AvatarSource::Placeholder, false), AvatarBadge::Empty);
    }

    #[test]
    fn control_chars_are_ignored() {
        let mut input = InputLine::default();
        input.insert("a\nb\r");
        assert_eq!(input.text(), "ab");
    }
}
