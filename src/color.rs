use colored::Colorize;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Terminal colour used for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
}

impl Color {
    /// Wrap `text` in this colour.
    ///
    /// `colored` decides whether escapes are emitted, so `NO_COLOR`,
    /// `CLICOLOR` and `CLICOLOR_FORCE` are honoured.
    pub fn paint(self, text: &str) -> String {
        text.color(colored::Color::from(self)).to_string()
    }
}

impl From<Color> for colored::Color {
    fn from(color: Color) -> Self {
        match color {
            Color::Red => colored::Color::Red,
            Color::Green => colored::Color::Green,
            Color::Yellow => colored::Color::Yellow,
            Color::Blue => colored::Color::Blue,
            Color::Magenta => colored::Color::Magenta,
            Color::Cyan => colored::Color::Cyan,
            Color::LightGray => colored::Color::White,
            Color::LightRed => colored::Color::BrightRed,
            Color::LightGreen => colored::Color::BrightGreen,
            Color::LightYellow => colored::Color::BrightYellow,
            Color::LightBlue => colored::Color::BrightBlue,
            Color::LightMagenta => colored::Color::BrightMagenta,
            Color::LightCyan => colored::Color::BrightCyan,
        }
    }
}

/// Colours handed out to process/area pairs, in assignment order.
pub const PALETTE: [Color; 10] = [
    Color::Blue,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::LightBlue,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightCyan,
    Color::LightRed,
];

/// Registry remembering which colour each `(process, area)` pair got.
///
/// The first lookup of a pair takes the next [`PALETTE`] entry (wrapping
/// once the palette is exhausted); every later lookup returns the same
/// colour. Racing first lookups of one pair agree on a single colour, and
/// the palette cursor only advances when an entry is actually inserted.
#[derive(Debug, Default)]
pub struct ColorRegistry {
    assigned: RwLock<HashMap<(String, String), Color>>,
    next: AtomicUsize,
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by handlers that are not given one.
    pub fn global() -> Arc<ColorRegistry> {
        static GLOBAL: OnceLock<Arc<ColorRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ColorRegistry::new())))
    }

    pub fn color_for(&self, process: &str, area: &str) -> Color {
        let key = (process.to_string(), area.to_string());
        if let Some(color) = self.assigned.read().get(&key) {
            return *color;
        }

        // Entry API under the write lock: a racing thread that inserted
        // first wins and we return its colour.
        let mut assigned = self.assigned.write();
        *assigned.entry(key).or_insert_with(|| {
            let index = self.next.fetch_add(1, Ordering::Relaxed);
            PALETTE[index % PALETTE.len()]
        })
    }

    /// Number of pairs seen so far.
    pub fn len(&self) -> usize {
        self.assigned.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
