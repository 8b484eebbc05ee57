//! Text measurement, truncation, and font registration.

use std::path::PathBuf;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable naming a TrueType font used for bitmap export.
pub const FONT_ENV: &str = "DSPLOT_FONT";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// One-time registration of a "sans-serif" font for the `ab_glyph` text path,
/// which does not discover OS fonts on its own.
static INIT_FONTS: Once = Once::new();
static FONT_READY: AtomicBool = AtomicBool::new(false);

/// Register a font once per process; returns whether one is available.
pub fn ensure_fonts_registered() -> bool {
    INIT_FONTS.call_once(|| {
        let env = std::env::var_os(FONT_ENV).map(PathBuf::from);
        let candidates = env
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));
        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // registered fonts must outlive the process-wide font table
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font(
                "sans-serif",
                plotters::style::FontStyle::Normal,
                bytes,
            )
            .is_ok()
            {
                log::debug!("registered font {}", path.display());
                FONT_READY.store(true, Ordering::Relaxed);
                return;
            }
        }
        log::warn!("no usable font found (set {FONT_ENV}); bitmap output will omit text");
    });
    FONT_READY.load(Ordering::Relaxed)
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    (text.chars().count() as f64 * font_px * 0.60).ceil()
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: f64, max_px: f64) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + font_px * 0.6 > max_px {
            out.pop();
            break;
        }
    }
    if out.is_empty() {
        return out;
    }
    out.push('…');
    out
}
