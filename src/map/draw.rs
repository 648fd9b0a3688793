use geo::LineString;

use crate::braille::BrailleCanvas;
use crate::map::projection::Viewport;

/// Stroke style for ring outlines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stroke {
    Solid,
    /// Doubled line for the highlighted landmark
    Thick,
    /// Broken line while a draw is in progress
    Dashed,
}

/// Draw a line using Bresenham's algorithm.
/// `pattern` decides per step whether the pixel is set.
fn draw_line_with(
    canvas: &mut BrailleCanvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    mut pattern: impl FnMut(usize) -> bool,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;
    let mut step = 0;

    loop {
        if pattern(step) {
            canvas.set_pixel_signed(x, y);
        }
        step += 1;

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line_with(canvas, x0, y0, x1, y1, |_| true);
}

/// Three pixels on, two off
pub fn draw_dashed_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line_with(canvas, x0, y0, x1, y1, |step| step % 5 < 3);
}

pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
}

/// Draw a point marker (small cross)
pub fn draw_marker(canvas: &mut BrailleCanvas, x: i32, y: i32, size: i32) {
    for i in -size..=size {
        canvas.set_pixel_signed(x + i, y);
        canvas.set_pixel_signed(x, y + i);
    }
}

/// Filled disc, used for the chosen bus stop
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Clip a pixel-space segment to the canvas plus a one pixel margin
/// (Liang-Barsky). `None` when nothing of it is on screen.
pub fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    width: f64,
    height: f64,
) -> Option<((i32, i32), (i32, i32))> {
    let (min_x, min_y, max_x, max_y) = (-1.0, -1.0, width + 1.0, height + 1.0);
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, a.0 - min_x),
        (dx, max_x - a.0),
        (-dy, a.1 - min_y),
        (dy, max_y - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let start = ((a.0 + t0 * dx).round() as i32, (a.1 + t0 * dy).round() as i32);
    let end = ((a.0 + t1 * dx).round() as i32, (a.1 + t1 * dy).round() as i32);
    Some((start, end))
}

/// Draw a pixel-space segment clipped to the viewport
pub fn draw_segment(
    canvas: &mut BrailleCanvas,
    a: (f64, f64),
    b: (f64, f64),
    viewport: &Viewport,
    stroke: Stroke,
) {
    let Some((p, q)) = clip_segment(a, b, viewport.width as f64, viewport.height as f64) else {
        return;
    };
    match stroke {
        Stroke::Solid => draw_line(canvas, p.0, p.1, q.0, q.1),
        Stroke::Thick => draw_thick_line(canvas, p.0, p.1, q.0, q.1),
        Stroke::Dashed => draw_dashed_line(canvas, p.0, p.1, q.0, q.1),
    }
}

/// Outline a closed lon/lat ring
pub fn draw_ring(
    canvas: &mut BrailleCanvas,
    ring: &LineString<f64>,
    viewport: &Viewport,
    stroke: Stroke,
) {
    for line in ring.lines() {
        let a = viewport.project_f(line.start.x, line.start.y);
        let b = viewport.project_f(line.end.x, line.end.y);
        if a != b {
            draw_segment(canvas, a, b, viewport, stroke);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extent;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut solid = BrailleCanvas::new(10, 1);
        let mut dashed = BrailleCanvas::new(10, 1);
        draw_line(&mut solid, 0, 0, 19, 0);
        draw_dashed_line(&mut dashed, 0, 0, 19, 0);
        assert!(dashed.dot_count() < solid.dot_count());
        assert!(!dashed.is_blank());
    }

    #[test]
    fn test_clip_segment() {
        // Fully inside is untouched
        assert_eq!(clip_segment((1.0, 1.0), (5.0, 3.0), 10.0, 10.0), Some(((1, 1), (5, 3))));
        // Crossing the canvas from far away is cut to the margin
        assert_eq!(
            clip_segment((-1e9, 5.0), (1e9, 5.0), 10.0, 10.0),
            Some(((-1, 5), (11, 5)))
        );
        assert_eq!(clip_segment((-50.0, -50.0), (-20.0, 30.0), 10.0, 10.0), None);
    }

    #[test]
    fn test_ring_off_screen_draws_nothing() {
        let viewport = Viewport::at_level((76.9, 8.5), 14.0, 40, 40);
        let mut canvas = BrailleCanvas::new(20, 10);
        let far = Extent::from_corners((10.0, 10.0), (10.01, 10.01)).to_polygon();
        draw_ring(&mut canvas, far.exterior(), &viewport, Stroke::Solid);
        assert!(canvas.is_blank());

        let near = Extent::from_corners((76.899, 8.499), (76.901, 8.501)).to_polygon();
        draw_ring(&mut canvas, near.exterior(), &viewport, Stroke::Thick);
        assert!(!canvas.is_blank());
    }
}
