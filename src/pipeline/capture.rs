//! Render Capture: rasterise a laid-out invoice view into a bitmap.
//!
//! ## Contract
//!
//! * The canvas is the view's bounds scaled by a fixed oversampling factor
//!   (2× by default), so the bitmap is export-quality rather than
//!   screen-resolution.
//! * The canvas is cleared to opaque white before anything draws. Invoices
//!   never export with a transparent or dark-theme background, whatever
//!   the surrounding UI looks like.
//! * Ops are anchored to the view's element bounds, not to the viewport:
//!   the surrounding document's scroll offset cancels out of the
//!   transform, so a capture taken while scrolled halfway down the page is
//!   identical to one taken at the top.
//! * Failure produces no bitmap at all: a missing or zero-sized view, or a
//!   text run with no typeface to draw it, aborts the capture.
//!
//! Rasterisation is CPU-bound; the orchestrators run it under
//! `tokio::task::spawn_blocking`.

use image::{imageops, Rgba, RgbaImage};
use rusttype::{point, Scale};
use tracing::debug;

use crate::error::InvoiceError;
use crate::layout::{DrawOp, InvoiceView, TextAlign, TextRun};

/// How a view is captured.
#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    /// Oversampling factor relative to on-screen size.
    pub scale: f32,
    /// Current vertical scroll offset of the surrounding document.
    /// Compensated during capture — it never affects the output.
    pub scroll_y: f32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            scroll_y: 0.0,
        }
    }
}

/// Rasterise `view` into an RGBA bitmap.
pub fn capture(view: &InvoiceView, opts: &CaptureOptions) -> Result<RgbaImage, InvoiceError> {
    if view.ops.is_empty() || view.bounds.w <= 0.0 || view.bounds.h <= 0.0 {
        return Err(InvoiceError::EmptyView);
    }
    let scale = opts.scale.clamp(1.0, 4.0);
    let width = (view.bounds.w * scale).round() as u32;
    let height = (view.bounds.h * scale).round() as u32;
    if width == 0 || height == 0 {
        return Err(InvoiceError::EmptyView);
    }

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

    // Scroll compensation: ops are in document coordinates. A naive
    // viewport grab would subtract the scroll offset from every y; we also
    // subtract it from the anchor (the element's top), so it cancels and
    // the capture always covers the element's own bounds.
    let anchor_x = view.bounds.x - 0.0;
    let anchor_y = view.bounds.y - opts.scroll_y;

    for op in &view.ops {
        match op {
            DrawOp::Fill(fill) => {
                let x0 = ((fill.rect.x - anchor_x) * scale).round() as i64;
                let y0 = ((fill.rect.y - opts.scroll_y - anchor_y) * scale).round() as i64;
                let x1 = x0 + (fill.rect.w * scale).round() as i64;
                let y1 = y0 + (fill.rect.h * scale).round().max(1.0) as i64;
                let color = Rgba([fill.color[0], fill.color[1], fill.color[2], 255]);
                for y in y0.max(0)..y1.min(height as i64) {
                    for x in x0.max(0)..x1.min(width as i64) {
                        canvas.put_pixel(x as u32, y as u32, color);
                    }
                }
            }
            DrawOp::Text(run) => {
                let face = view
                    .typeface
                    .as_deref()
                    .ok_or_else(|| InvoiceError::FontUnavailable {
                        detail: "view carries text but no typeface".to_string(),
                    })?;
                draw_text(&mut canvas, face, run, anchor_x, anchor_y, opts.scroll_y, scale);
            }
            DrawOp::Logo(slot) => {
                let Some(logo) = view.logo.as_ref() else {
                    continue;
                };
                let w = (slot.rect.w * scale).round().max(1.0) as u32;
                let h = (slot.rect.h * scale).round().max(1.0) as u32;
                let resized = imageops::resize(logo, w, h, imageops::FilterType::Triangle);
                let x0 = ((slot.rect.x - anchor_x) * scale).round() as i64;
                let y0 = ((slot.rect.y - opts.scroll_y - anchor_y) * scale).round() as i64;
                for (lx, ly, pixel) in resized.enumerate_pixels() {
                    let x = x0 + lx as i64;
                    let y = y0 + ly as i64;
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        continue;
                    }
                    blend(&mut canvas, x as u32, y as u32, *pixel);
                }
            }
        }
    }

    debug!(width, height, scale, "captured invoice view");
    Ok(canvas)
}

/// Draw one text run, alpha-blending glyph coverage over the canvas.
fn draw_text(
    canvas: &mut RgbaImage,
    face: &crate::font::Typeface,
    run: &TextRun,
    anchor_x: f32,
    anchor_y: f32,
    scroll_y: f32,
    scale: f32,
) {
    let px = run.px * scale;
    let font = face.font_for(run.weight);
    let glyph_scale = Scale::uniform(px);

    let mut x = (run.x - anchor_x) * scale;
    if run.align == TextAlign::Right {
        x -= face.measure(&run.text, px, run.weight);
    }
    let baseline = (run.y - scroll_y - anchor_y) * scale + face.ascent(px, run.weight);

    let (width, height) = canvas.dimensions();
    for glyph in font.layout(&run.text, glyph_scale, point(x, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let cx = bb.min.x + gx as i32;
            let cy = bb.min.y + gy as i32;
            if cx < 0 || cy < 0 || cx >= width as i32 || cy >= height as i32 {
                return;
            }
            let alpha = (coverage * 255.0).round() as u8;
            blend(
                canvas,
                cx as u32,
                cy as u32,
                Rgba([run.color[0], run.color[1], run.color[2], alpha]),
            );
        });
    }
}

/// Source-over blend of `src` onto the canvas pixel.
fn blend(canvas: &mut RgbaImage, x: u32, y: u32, src: Rgba<u8>) {
    let dst = canvas.get_pixel(x, y);
    let a = src[3] as f32 / 255.0;
    let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
    canvas.put_pixel(
        x,
        y,
        Rgba([
            mix(src[0], dst[0]),
            mix(src[1], dst[1]),
            mix(src[2], dst[2]),
            255,
        ]),
    );
}
