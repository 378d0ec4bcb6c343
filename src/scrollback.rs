use crate::display::DisplayLine;

pub const DEFAULT_VISIBLE_LINES: usize = 15;

/// Every line printed this session; only the newest `window` are shown.
#[derive(Debug, Clone)]
pub struct Scrollback {
    lines: Vec<DisplayLine>,
    window: usize,
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBLE_LINES)
    }
}

impl Scrollback {
    pub fn new(window: usize) -> Self {
        Self {
            lines: Vec::new(),
            window,
        }
    }

    pub fn append(&mut self, lines: impl IntoIterator<Item = DisplayLine>) {
        self.lines.extend(lines);
    }

    pub fn render(&self) -> &[DisplayLine] {
        let start = self.lines.len().saturating_sub(self.window);
        &self.lines[start..]
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
