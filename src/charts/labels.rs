//! Rotated Label Module
//! Stamps text at arbitrary angles onto a finished chart image.
//!
//! Plotters only rotates text by multiples of 90 degrees, so the label is
//! drawn upright into a scratch buffer and copied pixel by pixel.

use crate::error::{AnalysisError, Result};
use image::{Rgb, RgbImage};
use plotters::prelude::*;

/// Padding around the scratch text so antialiased edges are not clipped.
const PAD: u32 = 4;

/// Draw `text` rotated counter-clockwise by `degrees`, its bounding box
/// centred horizontally on `anchor.0` with its top edge at `anchor.1`.
pub fn stamp_rotated_label(
    img: &mut RgbImage,
    text: &str,
    font: &FontDesc<'_>,
    color: Rgb<u8>,
    anchor: (i32, i32),
    degrees: f64,
) -> Result<()> {
    let (text_w, text_h) = font
        .box_size(text)
        .map_err(|e| AnalysisError::Render(format!("measuring '{text}': {e:?}")))?;
    if text_w == 0 || text_h == 0 {
        return Ok(());
    }

    let (src_w, src_h) = (text_w + 2 * PAD, text_h + 2 * PAD);
    let mut scratch = vec![255u8; (src_w * src_h * 3) as usize];
    {
        let area = BitMapBackend::with_buffer(&mut scratch, (src_w, src_h)).into_drawing_area();
        let style = TextStyle::from(font.clone()).color(&BLACK);
        area.draw_text(text, &style, (PAD as i32, PAD as i32))
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
        area.present()
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
    }

    let (dst_w, dst_h) = rotated_extent(src_w, src_h, degrees);
    let origin_x = anchor.0 - dst_w as i32 / 2;
    let origin_y = anchor.1;
    let (sin, cos) = degrees.to_radians().sin_cos();

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            // Inverse-rotate about the box centres
            let rx = dx as f64 - dst_w as f64 / 2.0;
            let ry = dy as f64 - dst_h as f64 / 2.0;
            let sx = rx * cos - ry * sin + src_w as f64 / 2.0;
            let sy = rx * sin + ry * cos + src_h as f64 / 2.0;
            if sx < 0.0 || sy < 0.0 || sx >= src_w as f64 || sy >= src_h as f64 {
                continue;
            }

            let idx = ((sy as u32 * src_w + sx as u32) * 3) as usize;
            let ink = 255 - scratch[idx].min(scratch[idx + 1]).min(scratch[idx + 2]);
            if ink == 0 {
                continue;
            }

            let (px, py) = (origin_x + dx as i32, origin_y + dy as i32);
            if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                let pixel = img.get_pixel_mut(px as u32, py as u32);
                *pixel = blend(color, *pixel, ink);
            }
        }
    }
    Ok(())
}

/// Size of the axis-aligned box holding a `w`x`h` box rotated by `degrees`.
pub fn rotated_extent(w: u32, h: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    // Trim float noise so 90 degrees does not round up a pixel
    let span = |a: f64, b: f64| (a + b - 1e-9).ceil() as u32;
    (
        span(w as f64 * cos, h as f64 * sin),
        span(w as f64 * sin, h as f64 * cos),
    )
}

/// Simple alpha blend of `fg` over `bg`.
fn blend(fg: Rgb<u8>, bg: Rgb<u8>, alpha: u8) -> Rgb<u8> {
    let a = alpha as u16;
    let mix = |f: u8, b: u8| ((f as u16 * a + b as u16 * (255 - a)) / 255) as u8;
    Rgb([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2])])
}
