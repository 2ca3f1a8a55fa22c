use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line as PdfLine, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon, Pt, Rgb as PdfRgb, TextMatrix,
};
use printpdf::path::{PaintMode, WindingOrder};
use std::io::BufWriter;

use super::{Anchor, ChartLayout, HEIGHT, Label, Rgb, TITLE, WIDTH};
use crate::error::{GradebookError, Result};

/// Courier advances every glyph by 600/1000 of the font size.
const COURIER_ADVANCE: f64 = 0.6;

/// Draws `layout` on a single page with the built-in Courier font and
/// returns the PDF bytes. One layout pixel is one PDF point.
pub(super) fn render(layout: &ChartLayout) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(TITLE, pt(WIDTH as f64), pt(HEIGHT as f64), "Chart");
    let layer = doc.get_page(page).get_layer(layer);
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| GradebookError::Pdf(format!("font error: {e}")))?;

    layer.set_outline_thickness(0.75);
    for line in &layout.lines {
        layer.set_outline_color(color(line.color));
        layer.add_line(PdfLine {
            points: vec![
                (point(line.x1, line.y1), false),
                (point(line.x2, line.y2), false),
            ],
            is_closed: false,
        });
    }

    for bar in &layout.bars {
        layer.set_fill_color(color(bar.color));
        layer.add_polygon(Polygon {
            rings: vec![vec![
                (point(bar.x, bar.y), false),
                (point(bar.x + bar.w, bar.y), false),
                (point(bar.x + bar.w, bar.y + bar.h), false),
                (point(bar.x, bar.y + bar.h), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    layer.set_fill_color(color([0, 0, 0]));
    for label in &layout.labels {
        draw_label(&layer, &font, label);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| GradebookError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| GradebookError::Pdf(format!("buffer error: {e}")))
}

fn draw_label(layer: &PdfLayerReference, font: &IndirectFontRef, label: &Label) {
    let (x, y) = text_origin(label);

    if label.rotated {
        layer.begin_text_section();
        layer.set_font(font, label.size as f32);
        layer.set_text_matrix(TextMatrix::TranslateRotate(
            Pt(x as f32),
            Pt(y as f32),
            90.0,
        ));
        layer.write_text(label.text.clone(), font);
        layer.end_text_section();
    } else {
        layer.use_text(label.text.clone(), label.size as f32, pt(x), pt(y), font);
    }
}

/// Start of the baseline in PDF coordinates (origin bottom-left).
fn text_origin(label: &Label) -> (f64, f64) {
    let width = label.text.chars().count() as f64 * label.size * COURIER_ADVANCE;
    let shift = match label.anchor {
        Anchor::Start => 0.0,
        Anchor::Middle => width / 2.0,
        Anchor::End => width,
    };

    let y = HEIGHT as f64 - label.y;
    if label.rotated {
        (label.x, y - shift)
    } else {
        (label.x - shift, y)
    }
}

/// Layout y grows downwards, PDF y grows upwards.
fn point(x: f64, y: f64) -> Point {
    Point::new(pt(x), pt(HEIGHT as f64 - y))
}

fn pt(value: f64) -> Mm {
    Mm::from(Pt(value as f32))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(PdfRgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        None,
    ))
}
