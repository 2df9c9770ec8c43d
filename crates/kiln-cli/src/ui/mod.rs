//! Terminal output: status lines and the build summary.

mod format;
mod messages;

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::{OwoColorize, Style};

pub use format::{format_duration, print_build_summary};
pub use messages::{error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(
        !no_color && crate::logger::should_use_colors(),
        Ordering::Relaxed,
    );
}

/// `value` in `style`, or plain when colors are off.
pub(crate) fn paint(value: impl Display, style: Style) -> String {
    if COLORS.load(Ordering::Relaxed) {
        value.style(style).to_string()
    } else {
        value.to_string()
    }
}
