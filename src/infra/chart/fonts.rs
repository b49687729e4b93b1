use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{register_font, FontStyle};

const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static TEXT_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Registers a TrueType font for chart text, once per process. Returns
/// whether text can be drawn.
pub fn ensure_registered(preferred: Option<&Path>) -> bool {
    *TEXT_AVAILABLE.get_or_init(|| register_first_available(preferred))
}

fn register_first_available(preferred: Option<&Path>) -> bool {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_PATHS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // The font registry keeps the bytes for the life of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
            tracing::info!(path = %path.display(), "registered chart font");
            return true;
        }
        tracing::warn!(path = %path.display(), "ignoring unusable chart font");
    }

    tracing::warn!("no chart font found; charts will be rendered without text");
    false
}
