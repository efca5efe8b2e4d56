//! Document Export: turn a captured bitmap into a paginated A4 PDF.
//!
//! ## Pagination model
//!
//! The bitmap is scaled to the page's printable width with its aspect
//! ratio preserved. When the scaled height exceeds one printable page, the
//! *source bitmap* is sliced vertically: each page receives the horizontal
//! band that fills exactly one printable page height, and the last page
//! takes whatever remains. Summing the slice heights always reconstructs
//! the source height exactly — nothing is dropped or duplicated at page
//! boundaries.
//!
//! Each slice is embedded as a raw RGB image object whose DPI is chosen so
//! it spans the printable width; no resampling happens at export time, the
//! 2× capture already decided the quality.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{imageops, DynamicImage, RgbaImage};
use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::InvoiceError;

/// Page geometry for the exported document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageSetup {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Uniform margin around the printable area. The default of zero
    /// matches an edge-to-edge export.
    pub margin_mm: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        // ISO A4.
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 0.0,
        }
    }
}

impl PageSetup {
    pub fn printable_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    pub fn printable_height_mm(&self) -> f32 {
        self.height_mm - 2.0 * self.margin_mm
    }

    /// Height in source pixels of one full page slice, for a bitmap
    /// `bitmap_width` pixels wide scaled to the printable width.
    pub fn slice_height_px(&self, bitmap_width: u32) -> u32 {
        let px_per_mm = bitmap_width as f32 / self.printable_width_mm();
        (self.printable_height_mm() * px_per_mm).floor().max(1.0) as u32
    }
}

/// One vertical band of the source bitmap, destined for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub top: u32,
    pub height: u32,
}

/// Split `bitmap_height` into page slices of at most `slice_height` pixels.
///
/// Yields `ceil(bitmap_height / slice_height)` slices; every slice except
/// possibly the last has exactly `slice_height` rows, and the heights sum
/// to `bitmap_height`.
pub fn paginate(bitmap_height: u32, slice_height: u32) -> Vec<PageSlice> {
    let slice_height = slice_height.max(1);
    let mut slices = Vec::new();
    let mut top = 0;
    while top < bitmap_height {
        let height = slice_height.min(bitmap_height - top);
        slices.push(PageSlice { top, height });
        top += height;
    }
    slices
}

/// Filename for an export started now: `invoice_<epoch-millis>.pdf`.
/// The timestamp keeps repeated exports in one session from colliding.
pub fn export_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("invoice_{millis}.pdf")
}

/// Assemble the paginated PDF in memory.
pub fn export_pdf_bytes(bitmap: &RgbaImage, page: &PageSetup) -> Result<Vec<u8>, InvoiceError> {
    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(InvoiceError::EmptyBitmap);
    }

    let slice_height = page.slice_height_px(width);
    let slices = paginate(height, slice_height);
    info!(
        pages = slices.len(),
        width, height, "exporting captured bitmap"
    );

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Invoice",
        Mm(page.width_mm),
        Mm(page.height_mm),
        "invoice",
    );

    let px_per_mm = width as f32 / page.printable_width_mm();
    let dpi = px_per_mm * 25.4;

    for (index, slice) in slices.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(page.width_mm), Mm(page.height_mm), "invoice");
            doc.get_page(p).get_layer(l)
        };

        let band = imageops::crop_imm(bitmap, 0, slice.top, width, slice.height).to_image();
        let rgb = DynamicImage::ImageRgba8(band).to_rgb8();
        let slice_h_mm = slice.height as f32 / px_per_mm;

        let xobject = ImageXObject {
            width: Px(width as usize),
            height: Px(slice.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: rgb.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        };

        // translate is the image's bottom-left corner; anchor each band to
        // the top of the printable area.
        Image::from(xobject).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(page.margin_mm)),
                translate_y: Some(Mm(page.height_mm - page.margin_mm - slice_h_mm)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        debug!(page = index + 1, top = slice.top, rows = slice.height, "placed band");
    }

    doc.save_to_bytes().map_err(|e| InvoiceError::PdfWrite {
        detail: e.to_string(),
    })
}

/// Export to `dir/invoice_<epoch-millis>.pdf` and return the written path.
pub fn export_to_dir(
    bitmap: &RgbaImage,
    page: &PageSetup,
    dir: &Path,
) -> Result<PathBuf, InvoiceError> {
    let bytes = export_pdf_bytes(bitmap, page)?;
    let path = dir.join(export_filename());
    let mut file = std::fs::File::create(&path).map_err(|e| InvoiceError::OutputWrite {
        path: path.clone(),
        source: e,
    })?;
    file.write_all(&bytes).map_err(|e| InvoiceError::OutputWrite {
        path: path.clone(),
        source: e,
    })?;
    info!(path = %path.display(), "wrote PDF");
    Ok(path)
}
