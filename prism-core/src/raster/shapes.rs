//! Span decomposition of lines, rectangles, circles, ellipses and triangles
//!
//! Integer arithmetic only. Callers open the batch; these functions only
//! emit spans.

use super::{span, Paint};
use crate::error::Result;
use crate::traits::Surface;

pub(super) fn vline<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    h: i32,
    paint: Paint<'_>,
) -> Result<()> {
    let clip = s.clip_rect();
    let start = y.max(clip.y);
    let end = y.saturating_add(h).min(clip.bottom());
    for py in start..end {
        span(s, x, py, 1, paint)?;
    }
    Ok(())
}

pub(super) fn fill_rect<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    paint: Paint<'_>,
) -> Result<()> {
    let area = crate::geometry::Rect::new(x, y, w, h).intersect(&s.clip_rect());
    if area.is_empty() {
        return Ok(());
    }
    match paint {
        Paint::Solid(raw) => s.fill_area(area, raw),
        Paint::Pattern(_) => {
            for py in area.y..area.bottom() {
                span(s, area.x, py, area.w, paint)?;
            }
            Ok(())
        }
    }
}

pub(super) fn rect<S: Surface + ?Sized>(
    s: &mut S,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    paint: Paint<'_>,
) -> Result<()> {
    if w <= 0 || h <= 0 {
        return Ok(());
    }
    span(s, x, y, w, paint)?;
    if h > 1 {
        span(s, x, y.saturating_add(h - 1), w, paint)?;
    }
    if h > 2 {
        vline(s, x, y.saturating_add(1), h - 2, paint)?;
        if w > 1 {
            vline(s, x.saturating_add(w - 1), y.saturating_add(1), h - 2, paint)?;
        }
    }
    Ok(())
}

/// Bresenham line, endpoints inclusive
///
/// Shallow lines are emitted as horizontal runs.
pub(super) fn line<S: Surface + ?Sized>(
    s: &mut S,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    paint: Paint<'_>,
) -> Result<()> {
    if y0 == y1 {
        let (a, b) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        return span(s, a, y0, b - a + 1, paint);
    }
    if x0 == x1 {
        let (a, b) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        return vline(s, x0, a, b - a + 1, paint);
    }

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let (mut x0, mut y0, mut x1, mut y1) = if steep {
        (y0, x0, y1, x1)
    } else {
        (x0, y0, x1, y1)
    };
    if x0 > x1 {
        core::mem::swap(&mut x0, &mut x1);
        core::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let ystep = if y0 < y1 { 1 } else { -1 };
    let mut err = dx / 2;
    let mut y = y0;

    if steep {
        for x in x0..=x1 {
            span(s, y, x, 1, paint)?;
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
        return Ok(());
    }

    let mut run_start = x0;
    for x in x0..=x1 {
        err -= dy;
        if err < 0 {
            span(s, run_start, y, x - run_start + 1, paint)?;
            y += ystep;
            err += dx;
            run_start = x + 1;
        }
    }
    if run_start <= x1 {
        span(s, run_start, y, x1 - run_start + 1, paint)?;
    }
    Ok(())
}

/// Midpoint circle outline with 8-way symmetry
pub(super) fn circle<S: Surface + ?Sized>(
    s: &mut S,
    cx: i32,
    cy: i32,
    r: i32,
    paint: Paint<'_>,
) -> Result<()> {
    if r < 0 {
        return Ok(());
    }
    let mut x = 0;
    let mut y = r;
    let mut d = 1 - r;
    while x <= y {
        for (px, py) in octants(x, y) {
            span(s, cx + px, cy + py, 1, paint)?;
        }
        if d < 0 {
            d += 2 * x + 3;
        } else {
            d += 2 * (x - y) + 5;
            y -= 1;
        }
        x += 1;
    }
    Ok(())
}

/// Distinct symmetric points of (x, y) with 0 <= x <= y
fn octants(x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> {
    let points = [
        (x, y),
        (-x, y),
        (x, -y),
        (-x, -y),
        (y, x),
        (-y, x),
        (y, -x),
        (-y, -x),
    ];
    points
        .into_iter()
        .enumerate()
        .filter(move |&(i, (px, py))| {
            // Drop repeats produced when x == 0, y == 0 or x == y
            !points[..i].contains(&(px, py))
        })
        .map(|(_, p)| p)
}

/// Filled midpoint circle, one span per row
pub(super) fn fill_circle<S: Surface + ?Sized>(
    s: &mut S,
    cx: i32,
    cy: i32,
    r: i32,
    paint: Paint<'_>,
) -> Result<()> {
    if r < 0 {
        return Ok(());
    }
    let mut x = 0;
    let mut y = r;
    let mut d = 1 - r;
    while x <= y {
        // Rows at +-x are widest at the current y
        span(s, cx - y, cy + x, 2 * y + 1, paint)?;
        if x != 0 {
            span(s, cx - y, cy - x, 2 * y + 1, paint)?;
        }
        if d < 0 {
            d += 2 * x + 3;
        } else {
            // Rows at +-y are final before y steps inward
            if y > x {
                span(s, cx - x, cy + y, 2 * x + 1, paint)?;
                span(s, cx - x, cy - y, 2 * x + 1, paint)?;
            }
            d += 2 * (x - y) + 5;
            y -= 1;
        }
        x += 1;
    }
    Ok(())
}

/// Walk the first quadrant of an ellipse with the two-region midpoint
/// algorithm
///
/// Points arrive with `y` non-increasing from `ry` to 0 and `x`
/// non-decreasing. Decision variables are scaled by 4 to stay integral.
fn ellipse_quadrant<F>(rx: i32, ry: i32, mut visit: F) -> Result<()>
where
    F: FnMut(i32, i32) -> Result<()>,
{
    let rx2 = rx as i64 * rx as i64;
    let ry2 = ry as i64 * ry as i64;
    let mut x: i64 = 0;
    let mut y: i64 = ry as i64;
    let mut px: i64 = 0;
    let mut py: i64 = 2 * rx2 * y;

    let mut p = 4 * ry2 - 4 * rx2 * ry as i64 + rx2;
    while px < py {
        visit(x as i32, y as i32)?;
        x += 1;
        px += 2 * ry2;
        if p < 0 {
            p += 4 * (ry2 + px);
        } else {
            y -= 1;
            py -= 2 * rx2;
            p += 4 * (ry2 + px - py);
        }
    }

    p = ry2 * (2 * x + 1) * (2 * x + 1) + 4 * rx2 * (y - 1) * (y - 1) - 4 * rx2 * ry2;
    while y > 0 {
        visit(x as i32, y as i32)?;
        y -= 1;
        py -= 2 * rx2;
        if p > 0 {
            p += 4 * (rx2 - py);
        } else {
            x += 1;
            px += 2 * ry2;
            p += 4 * (rx2 - py + px);
        }
    }
    // Flat ellipses reach the last row before x reaches the radius
    for x in x..=rx as i64 {
        visit(x as i32, 0)?;
    }
    Ok(())
}

/// Midpoint ellipse outline with 4-way symmetry
pub(super) fn ellipse<S: Surface + ?Sized>(
    s: &mut S,
    cx: i32,
    cy: i32,
    rx: i32,
    ry: i32,
    paint: Paint<'_>,
) -> Result<()> {
    if rx < 0 || ry < 0 {
        return Ok(());
    }
    if rx == 0 || ry == 0 {
        return fill_rect(s, cx - rx, cy - ry, 2 * rx + 1, 2 * ry + 1, paint);
    }
    ellipse_quadrant(rx, ry, |x, y| {
        span(s, cx + x, cy + y, 1, paint)?;
        if x != 0 {
            span(s, cx - x, cy + y, 1, paint)?;
        }
        if y != 0 {
            span(s, cx + x, cy - y, 1, paint)?;
            if x != 0 {
                span(s, cx - x, cy - y, 1, paint)?;
            }
        }
        Ok(())
    })
}

/// Filled midpoint ellipse, one span per row
pub(super) fn fill_ellipse<S: Surface + ?Sized>(
    s: &mut S,
    cx: i32,
    cy: i32,
    rx: i32,
    ry: i32,
    paint: Paint<'_>,
) -> Result<()> {
    if rx < 0 || ry < 0 {
        return Ok(());
    }
    if rx == 0 || ry == 0 {
        return fill_rect(s, cx - rx, cy - ry, 2 * rx + 1, 2 * ry + 1, paint);
    }

    let mut row: Option<(i32, i32)> = None;
    let emit = |s: &mut S, x: i32, y: i32| -> Result<()> {
        span(s, cx - x, cy + y, 2 * x + 1, paint)?;
        if y != 0 {
            span(s, cx - x, cy - y, 2 * x + 1, paint)?;
        }
        Ok(())
    };
    ellipse_quadrant(rx, ry, |x, y| {
        if let Some((row_x, row_y)) = row {
            if row_y != y {
                emit(s, row_x, row_y)?;
            }
        }
        // The widest point of a row is the last one visited
        row = Some((x, y));
        Ok(())
    })?;
    if let Some((x, y)) = row {
        emit(s, x, y)?;
    }
    Ok(())
}

/// Filled triangle by scanline interpolation between the sorted edges
pub(super) fn fill_triangle<S: Surface + ?Sized>(
    s: &mut S,
    mut v: [(i32, i32); 3],
    paint: Paint<'_>,
) -> Result<()> {
    v.sort_unstable_by_key(|&(_, y)| y);
    let [(x0, y0), (x1, y1), (x2, y2)] = v;

    if y0 == y2 {
        let a = x0.min(x1).min(x2);
        let b = x0.max(x1).max(x2);
        return span(s, a, y0, b - a + 1, paint);
    }

    let (dx01, dy01) = ((x1 - x0) as i64, (y1 - y0) as i64);
    let (dx02, dy02) = ((x2 - x0) as i64, (y2 - y0) as i64);
    let (dx12, dy12) = ((x2 - x1) as i64, (y2 - y1) as i64);

    // Upper part includes the middle row only when the lower part is flat
    let last = if y1 == y2 { y1 } else { y1 - 1 };
    let mut sa: i64 = 0;
    let mut sb: i64 = 0;
    for y in y0..=last {
        let a = x0 + (sa / dy01) as i32;
        let b = x0 + (sb / dy02) as i32;
        sa += dx01;
        sb += dx02;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        span(s, a, y, b - a + 1, paint)?;
    }

    let first = last + 1;
    sa = dx12 * (first - y1) as i64;
    sb = dx02 * (first - y0) as i64;
    for y in first..=y2 {
        let a = x1 + (sa / dy12) as i32;
        let b = x0 + (sb / dy02) as i32;
        sa += dx12;
        sb += dx02;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        span(s, a, y, b - a + 1, paint)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::color::PixelFormat;
    use crate::geometry::Rect;
    use crate::sprite::Sprite;
    use crate::traits::Canvas;
    use proptest::prelude::*;

    fn canvas() -> Sprite {
        Sprite::new(64, 64, PixelFormat::RGB565).unwrap()
    }

    fn lit(s: &Sprite) -> alloc::vec::Vec<(i32, i32)> {
        let mut out = alloc::vec::Vec::new();
        for y in 0..s.height() as i32 {
            for x in 0..s.width() as i32 {
                if s.get_pixel(x, y) != Some(0) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_rect_outline_perimeter() {
        let mut s = canvas();
        s.draw_rect(5, 5, 10, 4, 1).unwrap();
        assert_eq!(lit(&s).len(), 2 * 10 + 2 * 4 - 4);
        assert_eq!(s.get_pixel(6, 6), Some(0));
    }

    #[test]
    fn test_fill_rect_clips_to_surface() {
        let mut s = canvas();
        s.fill_rect(-10, 60, 20, 20, 1).unwrap();
        assert_eq!(lit(&s).len(), 10 * 4);
    }

    #[test]
    fn test_extreme_rects_clip_without_overflow() {
        let mut s = canvas();
        s.fill_rect(i32::MAX - 5, 0, 10, 1, 1).unwrap();
        s.fill_rect(0, i32::MAX - 1, 4, 4, 1).unwrap();
        s.draw_rect(i32::MAX - 3, i32::MAX - 3, 8, 8, 1).unwrap();
        assert!(lit(&s).is_empty());

        s.fill_rect(i32::MIN, 2, i32::MAX, 1, 1).unwrap();
        assert!(lit(&s).is_empty());
        s.fill_rect(-4, 2, i32::MAX, 1, 1).unwrap();
        assert_eq!(lit(&s).len(), 64);
    }

    #[test]
    fn test_fill_respects_clip_rect() {
        let mut s = canvas();
        s.set_clip_rect(Rect::new(10, 10, 5, 5));
        s.fill_circle(12, 12, 20, 1).unwrap();
        s.clear_clip_rect();
        assert_eq!(lit(&s).len(), 25);
    }

    #[test]
    fn test_reversed_horizontal_line() {
        let mut s = canvas();
        s.draw_line(9, 3, 2, 3, 1).unwrap();
        assert_eq!(lit(&s).len(), 8);
    }

    #[test]
    fn test_fill_circle_radius_one_is_plus() {
        let mut s = canvas();
        s.fill_circle(10, 10, 1, 1).unwrap();
        assert_eq!(lit(&s), [(10, 9), (9, 10), (10, 10), (11, 10), (10, 11)]);
    }

    #[test]
    fn test_ellipse_extents() {
        let mut s = canvas();
        s.draw_ellipse(20, 20, 2, 1, 1).unwrap();
        assert_eq!(
            lit(&s),
            [(19, 19), (20, 19), (21, 19), (18, 20), (22, 20), (19, 21), (20, 21), (21, 21)]
        );

        let mut s = canvas();
        s.fill_ellipse(20, 20, 1, 3, 1).unwrap();
        assert_eq!(lit(&s).len(), 1 + 3 + 3 + 3 + 3 + 3 + 1);
    }

    #[test]
    fn test_fill_triangle_right_angle() {
        let mut s = canvas();
        s.fill_triangle(0, 0, 4, 0, 0, 4, 1).unwrap();
        assert_eq!(lit(&s).len(), 15);
        assert_eq!(s.get_pixel(0, 4), Some(1));
        assert_eq!(s.get_pixel(1, 4), Some(0));
    }

    #[test]
    fn test_pattern_fill_keeps_geometry() {
        let pattern = super::super::Pattern::new(super::super::Pattern::CHECKER, 1, Some(2));
        let mut solid = canvas();
        solid.fill_circle(30, 30, 9, 1).unwrap();
        let mut patterned = canvas();
        patterned.fill_circle_pattern(30, 30, 9, &pattern).unwrap();
        assert_eq!(lit(&solid), lit(&patterned));
        assert_eq!(patterned.get_pixel(30, 30), Some(1));
        assert_eq!(patterned.get_pixel(31, 30), Some(2));
    }

    proptest! {
        #[test]
        fn prop_line_is_connected_with_endpoints(
            x0 in 0i32..64, y0 in 0i32..64, x1 in 0i32..64, y1 in 0i32..64
        ) {
            let mut s = canvas();
            s.draw_line(x0, y0, x1, y1, 1).unwrap();
            let pixels = lit(&s);
            let expected = (x1 - x0).abs().max((y1 - y0).abs()) as usize + 1;
            prop_assert_eq!(pixels.len(), expected);
            prop_assert!(pixels.contains(&(x0, y0)));
            prop_assert!(pixels.contains(&(x1, y1)));
        }

        #[test]
        fn prop_circle_outline_inside_fill(r in 0i32..28) {
            let mut outline = canvas();
            outline.draw_circle(32, 32, r, 1).unwrap();
            let mut filled = canvas();
            filled.fill_circle(32, 32, r, 1).unwrap();
            let filled_px = lit(&filled);
            for p in lit(&outline) {
                prop_assert!(filled_px.contains(&p));
            }
            // Symmetric about both axes
            for &(x, y) in &filled_px {
                prop_assert!(filled_px.contains(&(64 - x, y)));
                prop_assert!(filled_px.contains(&(x, 64 - y)));
            }
        }

        #[test]
        fn prop_ellipse_inside_bounding_box(rx in 1i32..30, ry in 1i32..30) {
            let mut s = canvas();
            s.fill_ellipse(32, 32, rx, ry, 1).unwrap();
            for (x, y) in lit(&s) {
                prop_assert!((x - 32).abs() <= rx && (y - 32).abs() <= ry);
            }
            prop_assert_eq!(s.get_pixel(32, 32 - ry), Some(1));
            prop_assert_eq!(s.get_pixel(32, 32 + ry), Some(1));
        }
    }
}
