use ab_glyph::FontVec;
use std::path::{Path, PathBuf};

/// 常見系統字型位置
const SYSTEM_FONT_CANDIDATES: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn read_font(path: &Path) -> Option<FontVec> {
    let bytes = std::fs::read(path).ok()?;
    match FontVec::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::warn!("Ignoring unreadable font {}: {}", path.display(), e);
            None
        }
    }
}

/// Loads the configured font, falling back to well-known system fonts.
/// Returns `None` when nothing usable is found; the map is then drawn
/// without text.
pub fn load_font(configured: Option<&Path>) -> Option<FontVec> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        if let Some(font) = read_font(&path) {
            tracing::debug!("Using font {}", path.display());
            return Some(font);
        }
    }

    tracing::warn!("No usable font found; labels, title and grid labels will be skipped");
    None
}
