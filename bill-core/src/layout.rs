//! Invoice layout.
//!
//! Lays an [`Invoice`] out on an [`InvoiceSurface`]: a flat list of
//! drawing operations on a fixed-width canvas that grows downward. The
//! surface knows nothing about pages; splitting it is the exporter's job.

use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::invoice::Invoice;
use crate::money::{format_fixed, format_plain, format_signed, with_currency};
use crate::order::DiscountType;
use crate::pdf::{BuiltinFont, Color, FontMetrics};
use crate::shop::ShopProfile;

/// Canvas width in surface units.
pub const SURFACE_WIDTH: f64 = 560.0;
const MARGIN: f64 = 20.0;
const RIGHT: f64 = SURFACE_WIDTH - MARGIN;
const CELL_PAD: f64 = 8.0;

/// Item | Qty | Price | Total
const COLUMNS: [f64; 4] = [250.0, 70.0, 100.0, 100.0];
/// Left edge of the totals labels.
const TOTALS_X: f64 = 320.0;

const LOGO_HEIGHT: f64 = 128.0;
const QR_SIZE: f64 = 192.0;

fn purple_900() -> Color {
    Color::rgb(0.345, 0.11, 0.529)
}
fn purple_700() -> Color {
    Color::rgb(0.494, 0.133, 0.808)
}
fn purple_600() -> Color {
    Color::rgb(0.576, 0.2, 0.918)
}
fn lilac() -> Color {
    Color::rgb(0.953, 0.91, 1.0)
}
fn lilac_border() -> Color {
    Color::rgb(0.914, 0.835, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One drawing operation. Coordinates are in surface units with the
/// origin at the top-left and y growing downward.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// A single line of text. `x` is the anchor given by `align`.
    Text {
        text: String,
        x: f64,
        baseline: f64,
        font: BuiltinFont,
        size: f64,
        color: Color,
        align: TextAlign,
    },
    /// Horizontal line.
    Rule {
        x1: f64,
        x2: f64,
        y: f64,
        width: f64,
        color: Color,
    },
    Fill {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
    /// Image file scaled to fit the box, aspect ratio kept.
    Image {
        source: PathBuf,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl SurfaceOp {
    /// Vertical extent as `(top, bottom)`.
    pub fn extent(&self) -> (f64, f64) {
        match self {
            SurfaceOp::Text { baseline, size, .. } => (baseline - size, baseline + size * 0.25),
            SurfaceOp::Rule { y, width, .. } => (y - width / 2.0, y + width / 2.0),
            SurfaceOp::Fill { y, height, .. } | SurfaceOp::Image { y, height, .. } => (*y, y + height),
        }
    }
}

/// A laid-out invoice, ready to hand to an exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSurface {
    pub title: String,
    pub author: String,
    pub width: f64,
    pub height: f64,
    pub ops: Vec<SurfaceOp>,
}

impl InvoiceSurface {
    /// All text on the surface, top to bottom.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            SurfaceOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

/// Lay out `invoice` with the shop's branding.
pub fn layout_invoice(invoice: &Invoice, profile: &ShopProfile) -> InvoiceSurface {
    let mut pen = Pen::new();

    draw_header(&mut pen, profile);
    draw_details(&mut pen, invoice, profile);
    let table_bottom = draw_items(&mut pen, invoice, profile);
    pen.y = table_bottom;
    draw_totals(&mut pen, invoice, profile);
    draw_footer(&mut pen, profile);

    InvoiceSurface {
        title: format!("Invoice {}", invoice.number),
        author: profile.name.clone(),
        width: SURFACE_WIDTH,
        height: pen.y + MARGIN,
        ops: pen.ops,
    }
}

// -------------------------------------------------------
// Sections
// -------------------------------------------------------

fn draw_header(pen: &mut Pen, profile: &ShopProfile) {
    if let Some(logo) = &profile.logo {
        let width = LOGO_HEIGHT * 2.0;
        pen.ops.push(SurfaceOp::Image {
            source: logo.clone(),
            x: (SURFACE_WIDTH - width) / 2.0,
            y: pen.y,
            width,
            height: LOGO_HEIGHT,
        });
        pen.gap(LOGO_HEIGHT + 12.0);
    }
    pen.line(&profile.name, BuiltinFont::HelveticaBold, 26.0, purple_900(), TextAlign::Center);
    pen.gap(4.0);
    if !profile.tagline.trim().is_empty() {
        pen.line(&profile.tagline, BuiltinFont::HelveticaOblique, 12.0, purple_600(), TextAlign::Center);
        pen.gap(2.0);
    }
    if !profile.address.trim().is_empty() {
        pen.line(&profile.address, BuiltinFont::Helvetica, 11.0, purple_700(), TextAlign::Center);
    }
    if !profile.phone.trim().is_empty() {
        let phone = format!("Phone: {}", profile.phone.trim());
        pen.line(&phone, BuiltinFont::Helvetica, 11.0, purple_700(), TextAlign::Center);
    }
    pen.gap(10.0);
    pen.rule(MARGIN, RIGHT, 2.0, lilac_border());
    pen.gap(14.0);
}

fn draw_details(pen: &mut Pen, invoice: &Invoice, profile: &ShopProfile) {
    let zone = profile.timezone_or_ist();
    pen.field("Bill No:", invoice.number.as_str());
    pen.field("Date:", &invoice.display_timestamp(&zone));
    pen.field("Customer:", invoice.customer_display_name());
    pen.field("Source:", &invoice.customer_source.label());
    if let Some(referrer) = &invoice.referred_by {
        pen.field("Referred by:", referrer);
    }
    if let Some(delivery) = &invoice.delivery {
        pen.field("Delivery:", "Yes");
        if let Some(mode) = &delivery.mode {
            pen.field("Mode:", mode);
        }
    }
    pen.gap(14.0);
}

/// Returns the y coordinate below the last row.
fn draw_items(pen: &mut Pen, invoice: &Invoice, profile: &ShopProfile) -> f64 {
    let size = 11.0;
    let lh = FontMetrics::line_height(size);
    let col_x = column_lefts();
    let table_width: f64 = COLUMNS.iter().sum();

    // Header row.
    let header_h = lh + 2.0 * CELL_PAD;
    pen.ops.push(SurfaceOp::Fill {
        x: MARGIN,
        y: pen.y,
        width: table_width,
        height: header_h,
        color: lilac(),
    });
    let baseline = pen.y + CELL_PAD + size;
    let headers = [
        ("Item", TextAlign::Left),
        ("Qty", TextAlign::Center),
        ("Price", TextAlign::Right),
        ("Total", TextAlign::Right),
    ];
    for (i, (label, align)) in headers.iter().enumerate() {
        pen.cell(label, col_x[i], COLUMNS[i], baseline, BuiltinFont::HelveticaBold, size, purple_900(), *align);
    }
    pen.y += header_h;

    for item in &invoice.items {
        let name_lines = wrap_text(
            &item.name,
            BuiltinFont::Helvetica,
            size,
            COLUMNS[0] - 2.0 * CELL_PAD,
        );
        let row_h = name_lines.len() as f64 * lh + 2.0 * CELL_PAD;
        let first_baseline = pen.y + CELL_PAD + size;

        for (n, line) in name_lines.iter().enumerate() {
            pen.cell(
                line,
                col_x[0],
                COLUMNS[0],
                first_baseline + n as f64 * lh,
                BuiltinFont::Helvetica,
                size,
                purple_900(),
                TextAlign::Left,
            );
        }
        pen.cell(
            &item.quantity.to_string(),
            col_x[1],
            COLUMNS[1],
            first_baseline,
            BuiltinFont::Helvetica,
            size,
            purple_700(),
            TextAlign::Center,
        );
        pen.cell(
            &format!("{}{}", profile.currency, format_plain(item.selling_price)),
            col_x[2],
            COLUMNS[2],
            first_baseline,
            BuiltinFont::Helvetica,
            size,
            purple_700(),
            TextAlign::Right,
        );
        pen.cell(
            &with_currency(&profile.currency, item.total_selling),
            col_x[3],
            COLUMNS[3],
            first_baseline,
            BuiltinFont::HelveticaBold,
            size,
            purple_900(),
            TextAlign::Right,
        );

        pen.y += row_h;
        pen.ops.push(SurfaceOp::Rule {
            x1: MARGIN,
            x2: MARGIN + table_width,
            y: pen.y,
            width: 1.0,
            color: lilac_border(),
        });
    }
    pen.y + 16.0
}

fn draw_totals(pen: &mut Pen, invoice: &Invoice, profile: &ShopProfile) {
    let bill = &invoice.bill;
    let money = |v: Decimal| with_currency(&profile.currency, v);

    pen.total_row("Subtotal:", &money(bill.subtotal), false);
    if bill.delivery_charge_applied > Decimal::ZERO {
        pen.total_row("Delivery Charge:", &money(bill.delivery_charge_applied), false);
    }
    // A negative discount is a surcharge and is not shown as a discount.
    if bill.discount_applied > Decimal::ZERO && format_fixed(bill.discount_applied) != "0.00" {
        let label = match invoice.discount.discount_type {
            DiscountType::Percentage => {
                format!("Discount ({}%):", format_plain(invoice.discount.amount))
            }
            DiscountType::Fixed => "Discount:".to_string(),
        };
        pen.total_row(&label, &money(-bill.discount_applied), false);
    }
    if invoice.round_off && format_fixed(bill.round_off_delta) != "0.00" {
        pen.total_row("Round Off:", &format_signed(bill.round_off_delta), false);
    }
    pen.gap(4.0);
    pen.rule(TOTALS_X, RIGHT, 2.0, purple_600());
    pen.gap(8.0);
    pen.total_row("Grand Total:", &money(bill.final_total), true);
    pen.gap(16.0);
}

fn draw_footer(pen: &mut Pen, profile: &ShopProfile) {
    pen.rule(MARGIN, RIGHT, 2.0, lilac_border());
    pen.gap(18.0);
    if !profile.follow_text.trim().is_empty() {
        pen.line(&profile.follow_text, BuiltinFont::HelveticaBold, 12.0, purple_900(), TextAlign::Center);
        pen.gap(8.0);
    }
    if let Some(qr) = &profile.qr_code {
        pen.ops.push(SurfaceOp::Image {
            source: qr.clone(),
            x: (SURFACE_WIDTH - QR_SIZE) / 2.0,
            y: pen.y,
            width: QR_SIZE,
            height: QR_SIZE,
        });
        pen.gap(QR_SIZE + 8.0);
    }
    if !profile.social_handle.trim().is_empty() {
        pen.line(&profile.social_handle, BuiltinFont::HelveticaBold, 14.0, purple_700(), TextAlign::Center);
        pen.gap(6.0);
    }
    for line in &profile.thank_you_lines {
        pen.line(line, BuiltinFont::HelveticaOblique, 10.0, purple_600(), TextAlign::Center);
    }
}

// -------------------------------------------------------
// Pen
// -------------------------------------------------------

/// Write head moving down the surface.
struct Pen {
    ops: Vec<SurfaceOp>,
    y: f64,
}

impl Pen {
    fn new() -> Self {
        Pen {
            ops: Vec::new(),
            y: MARGIN,
        }
    }

    fn gap(&mut self, height: f64) {
        self.y += height;
    }

    /// One full-width line of text; advances by its line height.
    fn line(&mut self, text: &str, font: BuiltinFont, size: f64, color: Color, align: TextAlign) {
        let x = match align {
            TextAlign::Left => MARGIN,
            TextAlign::Center => SURFACE_WIDTH / 2.0,
            TextAlign::Right => RIGHT,
        };
        self.text(text, x, self.y + size, font, size, color, align);
        self.y += FontMetrics::line_height(size);
    }

    /// Bold label followed by a regular value.
    fn field(&mut self, label: &str, value: &str) {
        let size = 11.0;
        let baseline = self.y + size;
        self.text(label, MARGIN, baseline, BuiltinFont::HelveticaBold, size, purple_900(), TextAlign::Left);
        let value_x = MARGIN + FontMetrics::measure_text(label, BuiltinFont::HelveticaBold, size) + 4.0;
        self.text(value, value_x, baseline, BuiltinFont::Helvetica, size, purple_700(), TextAlign::Left);
        self.y += FontMetrics::line_height(size) + 2.0;
    }

    /// Label at the totals column, amount flush right.
    fn total_row(&mut self, label: &str, amount: &str, emphasize: bool) {
        let (font, size) = if emphasize {
            (BuiltinFont::HelveticaBold, 15.0)
        } else {
            (BuiltinFont::Helvetica, 11.0)
        };
        let baseline = self.y + size;
        self.text(label, TOTALS_X, baseline, font, size, purple_900(), TextAlign::Left);
        self.text(amount, RIGHT, baseline, font, size, purple_900(), TextAlign::Right);
        self.y += FontMetrics::line_height(size) + 4.0;
    }

    /// Text inside a table column, honouring cell padding.
    #[allow(clippy::too_many_arguments)]
    fn cell(
        &mut self,
        text: &str,
        col_x: f64,
        col_width: f64,
        baseline: f64,
        font: BuiltinFont,
        size: f64,
        color: Color,
        align: TextAlign,
    ) {
        let x = match align {
            TextAlign::Left => col_x + CELL_PAD,
            TextAlign::Center => col_x + col_width / 2.0,
            TextAlign::Right => col_x + col_width - CELL_PAD,
        };
        self.text(text, x, baseline, font, size, color, align);
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        text: &str,
        x: f64,
        baseline: f64,
        font: BuiltinFont,
        size: f64,
        color: Color,
        align: TextAlign,
    ) {
        self.ops.push(SurfaceOp::Text {
            text: text.to_string(),
            x,
            baseline,
            font,
            size,
            color,
            align,
        });
    }

    fn rule(&mut self, x1: f64, x2: f64, width: f64, color: Color) {
        self.ops.push(SurfaceOp::Rule {
            x1,
            x2,
            y: self.y,
            width,
            color,
        });
    }
}

fn column_lefts() -> [f64; 4] {
    let mut lefts = [MARGIN; 4];
    for i in 1..COLUMNS.len() {
        lefts[i] = lefts[i - 1] + COLUMNS[i - 1];
    }
    lefts
}

/// Greedy word wrap. Words wider than the line are split between
/// characters.
pub fn wrap_text(text: &str, font: BuiltinFont, size: f64, max_width: f64) -> Vec<String> {
    let space = FontMetrics::measure_text(" ", font, size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0.0;

    for word in text.split_whitespace() {
        let word_w = FontMetrics::measure_text(word, font, size);
        if !current.is_empty() && width + space + word_w <= max_width {
            current.push(' ');
            current.push_str(word);
            width += space + word_w;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if word_w <= max_width {
            current.push_str(word);
            width = word_w;
            continue;
        }
        // Oversized word: break it into pieces that fit.
        width = 0.0;
        for ch in word.chars() {
            let ch_w = FontMetrics::char_width(font, ch) as f64 * size / 1000.0;
            if !current.is_empty() && width + ch_w > max_width {
                lines.push(std::mem::take(&mut current));
                width = 0.0;
            }
            current.push(ch);
            width += ch_w;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
