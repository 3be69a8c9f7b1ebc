//! Terminal output: prefixed log lines, a progress bar and the watch status line.
//!
//! ```ignore
//! log!("content"; "loaded {} posts", count);
//!
//! let bar = ProgressBar::new("images", paths.len());
//! paths.par_iter().for_each(|p| { process(p); bar.inc(); });
//! bar.finish();
//! ```

use colored::{ColoredString, Colorize};
use parking_lot::Mutex;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::{
        OnceLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Whether a progress bar currently owns the last terminal line
static BAR_ACTIVE: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Layout Constants
// ============================================================================
//
// "[images] [████░░░░] 42/100"
//  ^------^ ^-------^ ^----^
//  prefix   bar       count

/// `[`, `]` and the trailing space
const PREFIX_OVERHEAD: usize = 3;
/// " []" around the bar and the space before the count
const BAR_OVERHEAD: usize = 4;
const MIN_BAR_WIDTH: usize = 10;
const MAX_BAR_WIDTH: usize = 40;

fn terminal_width() -> usize {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120)) as usize
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Print `[module] message`, truncating single-line messages to the terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut stdout = stdout().lock();

    let bar_active = BAR_ACTIVE.load(Ordering::SeqCst);
    if bar_active {
        execute!(stdout, cursor::MoveUp(1)).ok();
    }
    execute!(stdout, Clear(ClearType::CurrentLine)).ok();

    let message = if message.contains('\n') {
        message
    } else {
        let max_len = terminal_width().saturating_sub(module.len() + PREFIX_OVERHEAD);
        truncate_str(message, max_len)
    };
    writeln!(stdout, "{prefix} {message}").ok();

    // Leave an empty line for the bar to redraw into
    if bar_active {
        writeln!(stdout).ok();
    }
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Progress Bar
// ============================================================================

/// A single progress bar redrawn in place on the last terminal line.
///
/// Safe to drive from rayon workers: the counter is atomic and drawing is
/// serialized behind a mutex.
pub struct ProgressBar {
    prefix: ColoredString,
    prefix_len: usize,
    total: usize,
    current: AtomicUsize,
    lock: Mutex<()>,
}

impl ProgressBar {
    pub fn new(module: &'static str, total: usize) -> Self {
        let mut stdout = stdout().lock();
        writeln!(stdout).ok();
        stdout.flush().ok();
        BAR_ACTIVE.store(true, Ordering::SeqCst);

        Self {
            prefix: colorize_prefix(module),
            prefix_len: module.len() + PREFIX_OVERHEAD,
            total,
            current: AtomicUsize::new(0),
            lock: Mutex::new(()),
        }
    }

    /// Only show a bar when there is more than one item to process.
    pub fn new_if_needed(module: &'static str, total: usize) -> Option<Self> {
        (total > 1).then(|| Self::new(module, total))
    }

    pub fn inc(&self) {
        let current = self.current.fetch_add(1, Ordering::Relaxed) + 1;
        self.draw(current);
    }

    fn draw(&self, current: usize) {
        let _guard = self.lock.lock();

        let count = format!("{current}/{}", self.total);
        let bar = render_bar(current, self.total, self.bar_width(count.len()));

        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveUp(1), Clear(ClearType::CurrentLine)).ok();
        writeln!(stdout, "{} [{bar}] {count}", self.prefix).ok();
        stdout.flush().ok();
    }

    fn bar_width(&self, count_len: usize) -> usize {
        terminal_width()
            .saturating_sub(self.prefix_len + BAR_OVERHEAD + count_len)
            .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
    }

    /// Erase the bar line.
    pub fn finish(&self) {
        if !BAR_ACTIVE.swap(false, Ordering::SeqCst) {
            return;
        }
        let _guard = self.lock.lock();
        let mut stdout = stdout().lock();
        execute!(stdout, cursor::MoveUp(1), Clear(ClearType::CurrentLine)).ok();
        stdout.flush().ok();
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        self.finish();
    }
}

fn render_bar(current: usize, total: usize, width: usize) -> String {
    let filled = if total > 0 {
        (current.min(total) * width) / total
    } else {
        0
    };
    "█".repeat(filled) + &"░".repeat(width - filled)
}

// ============================================================================
// Watch Status
// ============================================================================

/// Timestamped outcome line for watch mode, one per processed event.
pub struct WatchStatus;

impl WatchStatus {
    pub const fn new() -> Self {
        Self
    }

    pub fn success(&mut self, message: &str) {
        self.display(&"✓".green().to_string(), message);
    }

    pub fn unchanged(&mut self, path: &str) {
        self.display("", &format!("unchanged: {path}").dimmed().to_string());
    }

    pub fn warning(&mut self, message: &str) {
        self.display(&"!".magenta().to_string(), message);
    }

    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(&"✗".red().to_string(), &message);
    }

    fn display(&mut self, symbol: &str, message: &str) {
        let timestamp = format!("[{}]", chrono::Local::now().format("%H:%M:%S")).dimmed();
        let mut stdout = stdout().lock();
        if symbol.is_empty() {
            writeln!(stdout, "{timestamp} {message}").ok();
        } else {
            writeln!(stdout, "{timestamp} {symbol} {message}").ok();
        }
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_fits() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_str_cuts() {
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 0), "");
    }

    #[test]
    fn test_truncate_str_respects_char_boundary() {
        // "ä" is two bytes
        assert_eq!(truncate_str("äö", 3), "ä");
        assert_eq!(truncate_str("Hämeenlinna", 2), "H");
    }

    #[test]
    fn test_render_bar_proportions() {
        assert_eq!(render_bar(0, 4, 8), "░░░░░░░░");
        assert_eq!(render_bar(2, 4, 8), "████░░░░");
        assert_eq!(render_bar(4, 4, 8), "████████");
    }

    #[test]
    fn test_render_bar_overflow_and_empty_total() {
        assert_eq!(render_bar(9, 4, 4), "████");
        assert_eq!(render_bar(3, 0, 4), "░░░░");
    }
}
