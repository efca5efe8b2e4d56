//! Typeface loading and glyph measurement for the capture canvas.
//!
//! Rasterising text needs a real TrueType font. The host can point
//! [`crate::config::StudioConfig`] at one explicitly; otherwise discovery
//! walks the usual system font directories and takes the first parseable
//! `.ttf`. A `-Bold` sibling file is picked up automatically when present;
//! when it is not, bold runs fall back to the regular face rather than
//! failing the capture.

use std::fs;
use std::path::{Path, PathBuf};

use rusttype::{Font, Scale};
use tracing::debug;

use crate::error::InvoiceError;
use crate::layout::FontWeight;

/// Directories searched by [`Typeface::discover`], in order.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Well-known faces tried before any directory walk.
const PREFERRED_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
];

/// A loaded typeface: the regular face plus an optional bold sibling.
pub struct Typeface {
    regular: Font<'static>,
    bold: Option<Font<'static>>,
    source: String,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("source", &self.source)
            .field("has_bold", &self.bold.is_some())
            .finish()
    }
}

impl Typeface {
    /// Parse a typeface from raw TTF bytes. `source` is kept for error
    /// messages and logging only.
    pub fn from_bytes(bytes: Vec<u8>, source: &str) -> Result<Self, InvoiceError> {
        let regular = Font::try_from_vec(bytes).ok_or_else(|| InvoiceError::FontUnavailable {
            detail: format!("'{source}' is not a parseable TrueType font"),
        })?;
        Ok(Self {
            regular,
            bold: None,
            source: source.to_string(),
        })
    }

    /// Load a typeface from a `.ttf` file, picking up a `-Bold` sibling
    /// (e.g. `DejaVuSans.ttf` → `DejaVuSans-Bold.ttf`) when one exists.
    pub fn load(path: &Path) -> Result<Self, InvoiceError> {
        let bytes = fs::read(path).map_err(|e| InvoiceError::FontUnavailable {
            detail: format!("cannot read '{}': {e}", path.display()),
        })?;
        let mut face = Self::from_bytes(bytes, &path.display().to_string())?;
        if let Some(bold_path) = bold_sibling(path) {
            if let Ok(bytes) = fs::read(&bold_path) {
                face.bold = Font::try_from_vec(bytes);
                if face.bold.is_some() {
                    debug!(path = %bold_path.display(), "loaded bold sibling face");
                }
            }
        }
        Ok(face)
    }

    /// Find a usable typeface on this system, or `None` when no parseable
    /// `.ttf` exists in any of the searched directories.
    pub fn discover() -> Option<Self> {
        for candidate in PREFERRED_FONTS {
            let path = Path::new(candidate);
            if path.exists() {
                if let Ok(face) = Self::load(path) {
                    debug!(path = candidate, "discovered preferred typeface");
                    return Some(face);
                }
            }
        }
        for dir in FONT_DIRS {
            if let Some(path) = first_ttf(Path::new(dir), 0) {
                if let Ok(face) = Self::load(&path) {
                    debug!(path = %path.display(), "discovered typeface");
                    return Some(face);
                }
            }
        }
        None
    }

    /// Resolve the typeface for a capture: an explicit path wins, otherwise
    /// discovery; with neither, capture cannot proceed.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, InvoiceError> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::discover().ok_or_else(|| InvoiceError::FontUnavailable {
                detail: "no TrueType font found in the system font directories".to_string(),
            }),
        }
    }

    /// Where this face was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn font_for(&self, weight: FontWeight) -> &Font<'static> {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// Advance width of `text` at `px` pixels, used by layout for
    /// right-aligned columns. Kerning is ignored; the error is well under
    /// a pixel per glyph at invoice sizes.
    pub fn measure(&self, text: &str, px: f32, weight: FontWeight) -> f32 {
        let font = self.font_for(weight);
        let scale = Scale::uniform(px);
        text.chars()
            .map(|c| font.glyph(c).scaled(scale).h_metrics().advance_width)
            .sum()
    }

    /// Baseline offset (ascent) at `px` pixels.
    pub fn ascent(&self, px: f32, weight: FontWeight) -> f32 {
        self.font_for(weight)
            .v_metrics(Scale::uniform(px))
            .ascent
    }
}

/// `X.ttf` → `X-Bold.ttf` when the stem does not already carry a weight.
fn bold_sibling(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    if stem.to_ascii_lowercase().contains("bold") {
        return None;
    }
    let stem = stem.strip_suffix("-Regular").unwrap_or(stem);
    Some(path.with_file_name(format!("{stem}-Bold.{ext}")))
}

/// Depth-limited walk for the first `.ttf` file under `dir`.
fn first_ttf(dir: &Path, depth: usize) -> Option<PathBuf> {
    if depth > 3 {
        return None;
    }
    let mut entries: Vec<_> = fs::read_dir(dir).ok()?.flatten().map(|e| e.path()).collect();
    entries.sort();
    for path in &entries {
        if path.extension().and_then(|e| e.to_str()) == Some("ttf") {
            return Some(path.clone());
        }
    }
    for path in entries {
        if path.is_dir() {
            if let Some(found) = first_ttf(&path, depth + 1) {
                return Some(found);
            }
        }
    }
    None
}
