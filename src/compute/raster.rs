//! Deterministic CPU rasterizer for shape populations.
//!
//! Rendering goes through a tiny-skia pixmap: opaque white background, then
//! every individual painted in population order with source-over blending and
//! anti-aliasing disabled. Gene coordinates address pixel centers, so value
//! `v` maps to `v + 0.5` in path space.
//!
//! Coverage conventions:
//!
//! - Polygon: the even-odd interior plus every pixel its outline passes
//!   through, so a vertex at `(x, y)` always paints pixel `(x, y)` and
//!   collinear vertices paint their line.
//! - Circle: the disk covering the pixel box `[x - r, x + r] x [y - r, y + r]`.

use image::RgbImage;
use tiny_skia as sk;

use super::Population;
use crate::schema::ShapeKind;

/// Render a population onto an opaque white canvas of the population's size.
///
/// Pure: the same population always yields the same pixels.
pub fn render(population: &Population) -> RgbImage {
    let canvas = population.canvas();
    let mut pix = sk::Pixmap::new(canvas.width, canvas.height)
        .expect("canvas dimensions validated non-zero");
    pix.fill(sk::Color::WHITE);

    match population.kind() {
        ShapeKind::Polygon { sides } => {
            let mut coverage = sk::Mask::new(canvas.width, canvas.height)
                .expect("canvas dimensions validated non-zero");
            for individual in population.individuals() {
                paint_polygon(&mut pix, &mut coverage, sides, individual);
            }
        }
        ShapeKind::Circle { .. } => {
            for individual in population.individuals() {
                paint_circle(&mut pix, individual);
            }
        }
    }

    to_rgb(&pix)
}

#[inline]
fn pixel_center(v: u32) -> f32 {
    v as f32 + 0.5
}

fn solid_paint(color: &[u32]) -> sk::Paint<'static> {
    let mut paint = sk::Paint::default();
    paint.set_color_rgba8(color[0] as u8, color[1] as u8, color[2] as u8, color[3] as u8);
    paint.anti_alias = false;
    paint
}

/// One-pixel band centered on the outline. Round joins reach the outer half
/// of every vertex pixel, including at the turn-back of collinear vertices.
fn outline_stroke() -> sk::Stroke {
    sk::Stroke {
        width: 1.0,
        line_join: sk::LineJoin::Round,
        line_cap: sk::LineCap::Round,
        ..Default::default()
    }
}

/// Vertices in stored order, closed. Interior and outline are merged into one
/// coverage mask first, so each pixel is blended exactly once.
fn paint_polygon(pix: &mut sk::Pixmap, coverage: &mut sk::Mask, sides: usize, genes: &[u32]) {
    let (coords, color) = genes.split_at(2 * sides);
    if color[3] == 0 {
        return;
    }
    let paint = solid_paint(color);

    let (x0, y0) = (coords[0], coords[1]);
    if coords.chunks_exact(2).all(|p| p[0] == x0 && p[1] == y0) {
        // all vertices on one pixel
        if let Some(dot) = sk::Rect::from_xywh(x0 as f32, y0 as f32, 1.0, 1.0) {
            pix.fill_rect(dot, &paint, sk::Transform::identity(), None);
        }
        return;
    }

    let mut pb = sk::PathBuilder::new();
    for (i, point) in coords.chunks_exact(2).enumerate() {
        let (x, y) = (pixel_center(point[0]), pixel_center(point[1]));
        if i == 0 {
            pb.move_to(x, y);
        } else {
            pb.line_to(x, y);
        }
    }
    pb.close();
    let Some(path) = pb.finish() else {
        return;
    };
    let Some(outline) = path.stroke(&outline_stroke(), 1.0) else {
        return;
    };

    coverage.clear();
    let interior = path.bounds();
    // zero-area interiors (all vertices on one row or column) have no fill
    if interior.width() > 0.0 && interior.height() > 0.0 {
        coverage.fill_path(&path, sk::FillRule::EvenOdd, false, sk::Transform::identity());
    }
    coverage.fill_path(&outline, sk::FillRule::Winding, false, sk::Transform::identity());

    let b = outline.bounds();
    if let Some(area) = sk::Rect::from_ltrb(
        b.left().floor() - 1.0,
        b.top().floor() - 1.0,
        b.right().ceil() + 1.0,
        b.bottom().ceil() + 1.0,
    ) {
        pix.fill_rect(area, &paint, sk::Transform::identity(), Some(&*coverage));
    }
}

/// Disk covering the pixel box `[x - r, x + r] x [y - r, y + r]`.
fn paint_circle(pix: &mut sk::Pixmap, genes: &[u32]) {
    let color = &genes[3..];
    if color[3] == 0 {
        return;
    }
    let radius = genes[2] as f32 + 0.5;
    if let Some(path) =
        sk::PathBuilder::from_circle(pixel_center(genes[0]), pixel_center(genes[1]), radius)
    {
        pix.fill_path(
            &path,
            &solid_paint(color),
            sk::FillRule::EvenOdd,
            sk::Transform::identity(),
            None,
        );
    }
}

/// Drop the alpha channel. The background is opaque and source-over keeps it
/// opaque, so the premultiplied color bytes equal the straight ones.
fn to_rgb(pix: &sk::Pixmap) -> RgbImage {
    let rgb: Vec<u8> = pix
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RgbImage::from_raw(pix.width(), pix.height(), rgb).expect("buffer sized from pixmap")
}
