use embedded_graphics::mono_font::iso_8859_1::{FONT_6X10, FONT_7X13, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line as EgLine, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use image::{ImageFormat, RgbImage, imageops};
use std::convert::Infallible;
use std::path::Path;

use super::{Anchor, ChartLayout, HEIGHT, Label, Rgb, WIDTH};
use crate::error::Result;

const BACKGROUND: Rgb = [255, 255, 255];
const TEXT: Rgb = [0, 0, 0];

/// An [`RgbImage`] that embedded-graphics can draw on. Pixels outside the
/// image are dropped.
struct Canvas(RgbImage);

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Canvas(RgbImage::from_pixel(width, height, image::Rgb(BACKGROUND)))
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < self.0.width() && y < self.0.height() {
                self.0
                    .put_pixel(x, y, image::Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

/// Draws `layout` and saves it as PNG or JPEG, depending on the extension
/// of `path`.
pub(super) fn render(layout: &ChartLayout, path: &Path) -> Result<()> {
    let img = draw(layout);
    let format = ImageFormat::from_path(path)?;
    img.save_with_format(path, format)?;
    Ok(())
}

fn draw(layout: &ChartLayout) -> RgbImage {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);

    for line in &layout.lines {
        let _ = EgLine::new(
            Point::new(px(line.x1), px(line.y1)),
            Point::new(px(line.x2), px(line.y2)),
        )
        .into_styled(PrimitiveStyle::with_stroke(rgb888(line.color), 1))
        .draw(&mut canvas);
    }

    for bar in &layout.bars {
        let top_left = Point::new(px(bar.x), px(bar.y));
        let size = Point::new(px(bar.x + bar.w), px(bar.y + bar.h)) - top_left;
        let size = Size::new(size.x.max(0) as u32, size.y.max(0) as u32);
        let _ = Rectangle::new(top_left, size)
            .into_styled(PrimitiveStyle::with_fill(rgb888(bar.color)))
            .draw(&mut canvas);
    }

    for label in &layout.labels {
        draw_label(&mut canvas, label);
    }

    canvas.0
}

fn draw_label(canvas: &mut Canvas, label: &Label) {
    let font = font_for(label.size);
    let style = MonoTextStyle::new(font, rgb888(TEXT));

    if !label.rotated {
        let text_style = TextStyleBuilder::new()
            .alignment(alignment(label.anchor))
            .baseline(Baseline::Alphabetic)
            .build();
        let _ = Text::with_text_style(
            &label.text,
            Point::new(px(label.x), px(label.y)),
            style,
            text_style,
        )
        .draw(canvas);
        return;
    }

    // Draw horizontally on a strip, then turn it a quarter counter-clockwise.
    let glyph = font.character_size;
    let width = glyph.width * label.text.chars().count() as u32;
    let mut strip = Canvas::new(width.max(1), glyph.height);
    let _ = Text::with_baseline(&label.text, Point::zero(), style, Baseline::Top).draw(&mut strip);
    let turned = imageops::rotate270(&strip.0);

    let shift = match label.anchor {
        Anchor::Start => 0.0,
        Anchor::Middle => width as f64 / 2.0,
        Anchor::End => width as f64,
    };
    let left = px(label.x) as i64 - glyph.height as i64;
    let top = px(label.y - turned.height() as f64 + shift) as i64;
    imageops::overlay(&mut canvas.0, &turned, left, top);
}

fn font_for(size: f64) -> &'static MonoFont<'static> {
    match size {
        s if s >= 14.0 => &FONT_10X20,
        s if s >= 11.0 => &FONT_7X13,
        _ => &FONT_6X10,
    }
}

fn alignment(anchor: Anchor) -> Alignment {
    match anchor {
        Anchor::Start => Alignment::Left,
        Anchor::Middle => Alignment::Center,
        Anchor::End => Alignment::Right,
    }
}

fn rgb888(rgb: Rgb) -> Rgb888 {
    Rgb888::new(rgb[0], rgb[1], rgb[2])
}

fn px(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Line, Rect};

    fn label(text: &str, rotated: bool) -> Label {
        Label {
            x: 400.0,
            y: 250.0,
            size: 16.0,
            anchor: Anchor::Middle,
            rotated,
            text: text.into(),
        }
    }

    fn ink(img: &RgbImage) -> usize {
        img.pixels().filter(|p| p.0 != BACKGROUND).count()
    }

    #[test]
    fn test_bar_fills_its_rectangle() {
        let layout = ChartLayout {
            bars: vec![Rect {
                x: 10.0,
                y: 20.0,
                w: 5.0,
                h: 4.0,
                color: [1, 2, 3],
            }],
            ..Default::default()
        };
        let img = draw(&layout);

        assert_eq!(img.get_pixel(10, 20).0, [1, 2, 3]);
        assert_eq!(img.get_pixel(14, 23).0, [1, 2, 3]);
        assert_eq!(img.get_pixel(15, 23).0, BACKGROUND);
        assert_eq!(img.get_pixel(14, 24).0, BACKGROUND);
        assert_eq!(ink(&img), 20);
    }

    #[test]
    fn test_horizontal_line() {
        let layout = ChartLayout {
            lines: vec![Line {
                x1: 2.0,
                y1: 5.0,
                x2: 6.0,
                y2: 5.0,
                color: [0, 0, 0],
            }],
            ..Default::default()
        };
        let img = draw(&layout);

        assert_eq!(img.get_pixel(2, 5).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(6, 5).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(3, 4).0, BACKGROUND);
    }

    #[test]
    fn test_labels_put_ink_on_the_image() {
        let blank = draw(&ChartLayout::default());
        let titled = draw(&ChartLayout {
            labels: vec![label("Performance", false)],
            ..Default::default()
        });

        assert_eq!(ink(&blank), 0);
        assert!(ink(&titled) > 0);
        // Centered on x = 400, above the baseline at y = 250.
        let inked: Vec<_> = titled
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != BACKGROUND)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(inked.iter().all(|&(x, y)| (290..510).contains(&x) && (225..260).contains(&y)));
    }

    #[test]
    fn test_rotated_label_is_taller_than_wide() {
        let img = draw(&ChartLayout {
            labels: vec![label("Number of pupils", true)],
            ..Default::default()
        });
        let inked: Vec<_> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != BACKGROUND)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());

        let (min_x, max_x) = (
            inked.iter().map(|p| p.0).min().unwrap(),
            inked.iter().map(|p| p.0).max().unwrap(),
        );
        let (min_y, max_y) = (
            inked.iter().map(|p| p.1).min().unwrap(),
            inked.iter().map(|p| p.1).max().unwrap(),
        );
        assert!(max_y - min_y > 4 * (max_x - min_x));
        assert!(max_x <= 400);
    }
}
