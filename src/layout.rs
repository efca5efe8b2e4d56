//! Invoice layout: maps an invoice and a template to a laid-out view.
//!
//! The view is a flat list of absolutely-positioned draw primitives (text
//! runs, filled rectangles, a logo slot) plus the element's bounds within
//! the surrounding document. Templates restyle the same content — accent
//! colour, header treatment, rule weight — they never change what is on
//! the invoice, which is why template selection can be swapped after the
//! fact without touching the model.
//!
//! Coordinates are absolute document coordinates: the view may sit at any
//! origin on the page (the preview surface centres it below a toolbar, for
//! instance), and [`crate::pipeline::capture`] anchors on `bounds` rather
//! than on the viewport, which is what makes captures independent of
//! scroll position.

use std::sync::Arc;

use image::DynamicImage;

use crate::font::Typeface;
use crate::model::Invoice;
use crate::template::Template;
use crate::totals::{self, format_amount};

/// RGB colour.
pub type Color = [u8; 3];

const WHITE: Color = [255, 255, 255];
const INK: Color = [24, 24, 27];
const MUTED: Color = [113, 113, 122];

/// Layout width of the rendered invoice in CSS-like pixels (A4 at 96 dpi).
pub const VIEW_WIDTH: f32 = 794.0;
const PAD: f32 = 48.0;
const LOGO_BOX: f32 = 96.0;

/// An axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// One run of text. `x` is the anchor: left edge for left-aligned runs,
/// right edge for right-aligned ones. `y` is the top of the line box.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub px: f32,
    pub weight: FontWeight,
    pub align: TextAlign,
    pub color: Color,
    pub text: String,
}

/// A filled rectangle (also used for rules, as 1-pixel-high fills).
#[derive(Debug, Clone)]
pub struct FillRect {
    pub rect: Rect,
    pub color: Color,
}

/// Placement slot for the logo bitmap carried on the view.
#[derive(Debug, Clone)]
pub struct LogoSlot {
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub enum DrawOp {
    Text(TextRun),
    Fill(FillRect),
    Logo(LogoSlot),
}

/// A fully laid-out invoice: everything Render Capture needs.
pub struct InvoiceView {
    /// The element's bounds in document coordinates.
    pub bounds: Rect,
    /// Draw primitives in paint order.
    pub ops: Vec<DrawOp>,
    /// Typeface used for the text runs. `None` only for synthetic views
    /// without text.
    pub typeface: Option<Arc<Typeface>>,
    /// Decoded logo bitmap, drawn into the [`LogoSlot`].
    pub logo: Option<DynamicImage>,
}

impl std::fmt::Debug for InvoiceView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceView")
            .field("bounds", &self.bounds)
            .field("ops", &self.ops.len())
            .field("has_logo", &self.logo.is_some())
            .finish()
    }
}

/// Where the invoice sits on the page and how money is prefixed.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Top-left corner of the invoice element in document coordinates.
    pub origin: (f32, f32),
    /// Currency prefix for all monetary values.
    pub currency: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            origin: (0.0, 0.0),
            currency: "$".to_string(),
        }
    }
}

/// Per-template styling knobs.
struct Style {
    accent: Color,
    header_band: bool,
    centered_title: bool,
    rule_h: f32,
}

fn style_for(template: Template) -> Style {
    match template {
        Template::Classic => Style {
            accent: [30, 64, 120],
            header_band: false,
            centered_title: false,
            rule_h: 1.0,
        },
        Template::Modern => Style {
            accent: [124, 58, 237],
            header_band: false,
            centered_title: false,
            rule_h: 2.0,
        },
        Template::Minimal => Style {
            accent: [82, 82, 91],
            header_band: false,
            centered_title: true,
            rule_h: 1.0,
        },
        Template::Bold => Style {
            accent: [190, 24, 60],
            header_band: true,
            centered_title: false,
            rule_h: 2.0,
        },
    }
}

/// Internal cursor-based builder shared by all templates.
struct LayoutBuilder<'a> {
    ops: Vec<DrawOp>,
    x0: f32,
    y: f32,
    face: &'a Typeface,
    currency: String,
}

impl<'a> LayoutBuilder<'a> {
    fn text(&mut self, x: f32, y: f32, px: f32, weight: FontWeight, color: Color, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text(TextRun {
            x,
            y,
            px,
            weight,
            align: TextAlign::Left,
            color,
            text: text.to_string(),
        }));
    }

    fn text_right(&mut self, x: f32, y: f32, px: f32, weight: FontWeight, color: Color, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text(TextRun {
            x,
            y,
            px,
            weight,
            align: TextAlign::Right,
            color,
            text: text.to_string(),
        }));
    }

    fn fill(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill(FillRect { rect, color }));
    }

    fn rule(&mut self, y: f32, h: f32, color: Color) {
        self.fill(Rect::new(self.x0 + PAD, y, VIEW_WIDTH - 2.0 * PAD, h), color);
    }

    fn money(&self, value: rust_decimal::Decimal) -> String {
        format!("{}{}", self.currency, format_amount(value))
    }

    /// Greedy word-wrap of `text` to `max_w` pixels at `px`. Always yields
    /// at least one line for non-empty input; a single overlong word gets
    /// its own line rather than being split mid-word.
    fn wrap(&self, text: &str, px: f32, max_w: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if self.face.measure(&candidate, px, FontWeight::Regular) <= max_w
                    || current.is_empty()
                {
                    current = candidate;
                } else {
                    lines.push(current);
                    current = word.to_string();
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        lines
    }
}

/// Lay the invoice out against the chosen template.
///
/// Pure with respect to its inputs: the same invoice, template, typeface
/// and logo always produce the same view.
pub fn layout_invoice(
    invoice: &Invoice,
    template: Template,
    typeface: Arc<Typeface>,
    logo: Option<DynamicImage>,
    opts: &LayoutOptions,
) -> InvoiceView {
    let style = style_for(template);
    let (ox, oy) = opts.origin;
    let mut b = LayoutBuilder {
        ops: Vec::new(),
        x0: ox,
        y: oy + PAD,
        face: &typeface,
        currency: opts.currency.clone(),
    };
    let left = ox + PAD;
    let right = ox + VIEW_WIDTH - PAD;
    let accent = style.accent;

    // ── Header ───────────────────────────────────────────────────────────
    if style.header_band {
        b.fill(Rect::new(ox, oy, VIEW_WIDTH, 110.0), accent);
    }
    let header_ink = if style.header_band { WHITE } else { accent };

    if let Some(ref img) = logo {
        let (w, h) = (img.width() as f32, img.height() as f32);
        let scale = (LOGO_BOX / w).min(LOGO_BOX / h);
        b.ops.push(DrawOp::Logo(LogoSlot {
            rect: Rect::new(left, oy + 24.0, w * scale, h * scale),
        }));
    }

    let title_x = if style.centered_title {
        ox + VIEW_WIDTH / 2.0 - typeface.measure("INVOICE", 30.0, FontWeight::Bold) / 2.0
    } else {
        left + if logo.is_some() { LOGO_BOX + 24.0 } else { 0.0 }
    };
    b.text(title_x, oy + 32.0, 30.0, FontWeight::Bold, header_ink, "INVOICE");
    b.text(
        title_x,
        oy + 70.0,
        13.0,
        FontWeight::Regular,
        if style.header_band { WHITE } else { MUTED },
        &invoice.title,
    );

    // Company block, right-aligned in the header.
    let company_ink = if style.header_band { WHITE } else { INK };
    b.text_right(right, oy + 32.0, 15.0, FontWeight::Bold, company_ink, &invoice.company.name);
    b.text_right(
        right,
        oy + 52.0,
        12.0,
        FontWeight::Regular,
        if style.header_band { WHITE } else { MUTED },
        &invoice.company.phone,
    );
    b.text_right(
        right,
        oy + 68.0,
        12.0,
        FontWeight::Regular,
        if style.header_band { WHITE } else { MUTED },
        &invoice.company.address,
    );

    b.y = oy + 134.0;
    b.rule(b.y, style.rule_h, accent);
    b.y += 18.0;

    // ── Invoice meta ─────────────────────────────────────────────────────
    let meta_y = b.y;
    b.text(left, meta_y, 11.0, FontWeight::Bold, MUTED, "INVOICE NO");
    b.text(left, meta_y + 16.0, 13.0, FontWeight::Regular, INK, &invoice.meta.number);
    let mid = ox + VIEW_WIDTH / 2.0;
    b.text(mid - 80.0, meta_y, 11.0, FontWeight::Bold, MUTED, "DATE");
    if let Some(date) = invoice.meta.date {
        b.text(mid - 80.0, meta_y + 16.0, 13.0, FontWeight::Regular, INK, &date.to_string());
    }
    b.text_right(right, meta_y, 11.0, FontWeight::Bold, MUTED, "DUE DATE");
    if let Some(due) = invoice.meta.due_date {
        b.text_right(right, meta_y + 16.0, 13.0, FontWeight::Regular, INK, &due.to_string());
    }
    b.y = meta_y + 52.0;

    // ── Billing / shipping ───────────────────────────────────────────────
    let col_w = (VIEW_WIDTH - 2.0 * PAD - 32.0) / 2.0;
    let parties = [
        ("BILL TO", &invoice.billing, left),
        ("SHIP TO", &invoice.shipping, left + col_w + 32.0),
    ];
    let block_top = b.y;
    let mut block_bottom = block_top;
    for (label, party, x) in parties {
        let mut y = block_top;
        b.text(x, y, 11.0, FontWeight::Bold, accent, label);
        y += 18.0;
        b.text(x, y, 13.0, FontWeight::Bold, INK, &party.name);
        if !party.name.is_empty() {
            y += 17.0;
        }
        b.text(x, y, 12.0, FontWeight::Regular, MUTED, &party.phone);
        if !party.phone.is_empty() {
            y += 16.0;
        }
        for line in b.wrap(&party.address, 12.0, col_w) {
            b.text(x, y, 12.0, FontWeight::Regular, MUTED, &line);
            y += 16.0;
        }
        block_bottom = block_bottom.max(y);
    }
    b.y = block_bottom + 24.0;

    // ── Items table ──────────────────────────────────────────────────────
    let qty_x = right - 230.0;
    let rate_x = right - 130.0;
    let total_x = right;

    let head_y = b.y;
    b.fill(
        Rect::new(left, head_y - 6.0, VIEW_WIDTH - 2.0 * PAD, 28.0),
        if style.header_band { accent } else { [244, 244, 245] },
    );
    let head_ink = if style.header_band { WHITE } else { INK };
    b.text(left + 10.0, head_y, 12.0, FontWeight::Bold, head_ink, "ITEM");
    b.text_right(qty_x, head_y, 12.0, FontWeight::Bold, head_ink, "QTY");
    b.text_right(rate_x, head_y, 12.0, FontWeight::Bold, head_ink, "RATE");
    b.text_right(total_x - 10.0, head_y, 12.0, FontWeight::Bold, head_ink, "AMOUNT");
    b.y = head_y + 34.0;

    for item in &invoice.items {
        let row_y = b.y;
        let name = if item.name.is_empty() { "—" } else { item.name.as_str() };
        b.text(left + 10.0, row_y, 13.0, FontWeight::Regular, INK, name);
        b.text_right(qty_x, row_y, 13.0, FontWeight::Regular, INK, item.qty.trim());
        b.text_right(rate_x, row_y, 13.0, FontWeight::Regular, INK, item.amount.trim());
        let line_total = b.money(totals::line_total(item));
        b.text_right(total_x - 10.0, row_y, 13.0, FontWeight::Regular, INK, &line_total);
        b.y += 19.0;
        for line in b.wrap(&item.description, 11.0, VIEW_WIDTH - 2.0 * PAD - 260.0) {
            b.text(left + 10.0, b.y, 11.0, FontWeight::Regular, MUTED, &line);
            b.y += 15.0;
        }
        b.y += 6.0;
        b.rule(b.y - 2.0, 1.0, [228, 228, 231]);
        b.y += 8.0;
    }

    // ── Totals block ─────────────────────────────────────────────────────
    let totals = totals::compute_totals(&invoice.items, &invoice.tax);
    let label_x = right - 220.0;
    b.y += 6.0;
    b.text(label_x, b.y, 13.0, FontWeight::Regular, MUTED, "Subtotal");
    let subtotal = b.money(totals.subtotal);
    b.text_right(total_x, b.y, 13.0, FontWeight::Regular, INK, &subtotal);
    b.y += 20.0;
    let rate = totals::coerce_amount(&invoice.tax);
    let tax_label = if rate > rust_decimal::Decimal::ZERO {
        format!("Tax ({rate}%)")
    } else {
        "Tax".to_string()
    };
    b.text(label_x, b.y, 13.0, FontWeight::Regular, MUTED, &tax_label);
    let tax_amount = b.money(totals.tax_amount);
    b.text_right(total_x, b.y, 13.0, FontWeight::Regular, INK, &tax_amount);
    b.y += 24.0;
    b.fill(Rect::new(label_x, b.y - 6.0, total_x - label_x, 1.0), [212, 212, 216]);
    b.text(label_x, b.y, 15.0, FontWeight::Bold, INK, "Grand Total");
    let grand = b.money(totals.grand_total);
    b.text_right(total_x, b.y, 15.0, FontWeight::Bold, accent, &grand);
    b.y += 40.0;

    // ── Bank details ─────────────────────────────────────────────────────
    let has_account = !invoice.account.name.is_empty()
        || !invoice.account.number.is_empty()
        || !invoice.account.swift.is_empty();
    if has_account {
        b.text(left, b.y, 11.0, FontWeight::Bold, accent, "BANK DETAILS");
        b.y += 18.0;
        for (label, value) in [
            ("Account name", &invoice.account.name),
            ("Account number", &invoice.account.number),
            ("SWIFT", &invoice.account.swift),
        ] {
            if value.is_empty() {
                continue;
            }
            b.text(left, b.y, 12.0, FontWeight::Regular, MUTED, label);
            b.text(left + 140.0, b.y, 12.0, FontWeight::Regular, INK, value);
            b.y += 17.0;
        }
        b.y += 16.0;
    }

    // ── Notes ────────────────────────────────────────────────────────────
    if !invoice.notes.trim().is_empty() {
        b.text(left, b.y, 11.0, FontWeight::Bold, accent, "NOTES");
        b.y += 18.0;
        for line in b.wrap(&invoice.notes, 12.0, VIEW_WIDTH - 2.0 * PAD) {
            b.text(left, b.y, 12.0, FontWeight::Regular, MUTED, &line);
            b.y += 16.0;
        }
    }

    let height = (b.y - oy + PAD).max(400.0);
    let ops = b.ops;
    InvoiceView {
        bounds: Rect::new(ox, oy, VIEW_WIDTH, height),
        ops,
        typeface: Some(typeface),
        logo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EditingSession, ItemField};

    fn sample_invoice() -> Invoice {
        let mut s = EditingSession::new();
        s.set_title("Q1 retainer");
        s.set_item_field(0, ItemField::Name, "Design work");
        s.set_item_field(0, ItemField::Qty, "2");
        s.set_item_field(0, ItemField::Amount, "50");
        s.set_tax_rate("10");
        s.into_invoice()
    }

    fn discover_or_skip() -> Option<Arc<Typeface>> {
        match Typeface::discover() {
            Some(face) => Some(Arc::new(face)),
            None => {
                println!("SKIP — no system TrueType font found");
                None
            }
        }
    }

    #[test]
    fn layout_produces_ops_within_bounds() {
        let Some(face) = discover_or_skip() else { return };
        let view = layout_invoice(
            &sample_invoice(),
            Template::Classic,
            face,
            None,
            &LayoutOptions::default(),
        );
        assert!(!view.ops.is_empty());
        assert_eq!(view.bounds.w, VIEW_WIDTH);
        assert!(view.bounds.h >= 400.0);

        for op in &view.ops {
            if let DrawOp::Text(run) = op {
                assert!(run.y >= view.bounds.y);
                assert!(run.y <= view.bounds.y + view.bounds.h);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let Some(face) = discover_or_skip() else { return };
        let invoice = sample_invoice();
        let a = layout_invoice(
            &invoice,
            Template::Modern,
            Arc::clone(&face),
            None,
            &LayoutOptions::default(),
        );
        let b = layout_invoice(&invoice, Template::Modern, face, None, &LayoutOptions::default());
        assert_eq!(a.ops.len(), b.ops.len());
        assert_eq!(a.bounds, b.bounds);
    }

    #[test]
    fn origin_shifts_every_op() {
        let Some(face) = discover_or_skip() else { return };
        let invoice = sample_invoice();
        let base = layout_invoice(
            &invoice,
            Template::Minimal,
            Arc::clone(&face),
            None,
            &LayoutOptions::default(),
        );
        let shifted = layout_invoice(
            &invoice,
            Template::Minimal,
            face,
            None,
            &LayoutOptions {
                origin: (40.0, 300.0),
                ..LayoutOptions::default()
            },
        );
        assert_eq!(shifted.bounds.x, 40.0);
        assert_eq!(shifted.bounds.y, 300.0);
        assert_eq!(base.ops.len(), shifted.ops.len());

        let first_y = |view: &InvoiceView| {
            view.ops.iter().find_map(|op| match op {
                DrawOp::Text(run) => Some(run.y),
                _ => None,
            })
        };
        assert_eq!(first_y(&base).unwrap() + 300.0, first_y(&shifted).unwrap());
    }

    #[test]
    fn templates_restyle_without_changing_content() {
        let Some(face) = discover_or_skip() else { return };
        let invoice = sample_invoice();
        let text_of = |view: &InvoiceView| {
            let mut texts: Vec<String> = view
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text(run) => Some(run.text.clone()),
                    _ => None,
                })
                .collect();
            texts.sort();
            texts
        };
        let classic = text_of(&layout_invoice(
            &invoice,
            Template::Classic,
            Arc::clone(&face),
            None,
            &LayoutOptions::default(),
        ));
        let bold = text_of(&layout_invoice(
            &invoice,
            Template::Bold,
            face,
            None,
            &LayoutOptions::default(),
        ));
        assert_eq!(classic, bold, "same content across templates");
    }

    #[test]
    fn logo_slot_fits_the_logo_box() {
        let Some(face) = discover_or_skip() else { return };
        let logo = DynamicImage::new_rgba8(400, 100);
        let view = layout_invoice(
            &sample_invoice(),
            Template::Classic,
            face,
            Some(logo),
            &LayoutOptions::default(),
        );
        let slot = view
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Logo(slot) => Some(slot.rect),
                _ => None,
            })
            .expect("logo slot present");
        assert!(slot.w <= LOGO_BOX + 0.01);
        assert!(slot.h <= LOGO_BOX + 0.01);
        // Wide logo: width-constrained, aspect preserved.
        assert!((slot.w / slot.h - 4.0).abs() < 0.01);
    }

    #[test]
    fn money_runs_carry_the_currency_prefix() {
        let Some(face) = discover_or_skip() else { return };
        let view = layout_invoice(
            &sample_invoice(),
            Template::Classic,
            face,
            None,
            &LayoutOptions {
                currency: "€".to_string(),
                ..LayoutOptions::default()
            },
        );
        let has_grand_total = view.ops.iter().any(|op| match op {
            DrawOp::Text(run) => run.text == "€110.00",
            _ => false,
        });
        assert!(has_grand_total, "expected €110.00 grand total run");
    }
}
