/*!
Circle rasterization.

The controller has no circle primitive, so circles are drawn one point frame
at a time. Point generation is kept separate from sending so the geometry can
be checked without a display.
*/

use tracing::debug;

use crate::channel::Channel;
use crate::error::Result;
use crate::protocol::{HEIGHT, WIDTH};
use crate::session::Session;

fn floor_sqrt(value: i64) -> i64 {
    (value.max(0) as f64).sqrt().floor() as i64
}

/// The eight symmetric points for offset (a, b) around (cx, cy)
fn octants(cx: i64, cy: i64, a: i64, b: i64) -> [(i32, i32); 8] {
    [
        (cx + a, cy + b),
        (cx + b, cy + a),
        (cx + b, cy - a),
        (cx + a, cy - b),
        (cx - a, cy - b),
        (cx - b, cy - a),
        (cx - b, cy + a),
        (cx - a, cy + b),
    ]
    .map(|(x, y)| (x as i32, y as i32))
}

/// Outline points of a circle of radius `r`.
///
/// Walks `a` from 0 while `a <= b` with `b = floor(sqrt(r² - a²))`. At `a == 0`
/// `b` is pulled in by one so the apex lands on a pixel centre. Every step
/// yields eight points, duplicates included.
pub fn circle_outline_points(cx: i32, cy: i32, r: u16) -> Vec<(i32, i32)> {
    let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
    let mut points = Vec::new();
    if r == 0 {
        return points;
    }

    let (mut a, mut b) = (0i64, 0i64);
    while a <= b {
        b = floor_sqrt(r * r - a * a);
        if a == 0 {
            b -= 1;
        }
        points.extend(octants(cx, cy, a, b));
        a += 1;
    }
    points
}

/// Fill points of a disc of radius `r`, each the corner of a 2x2 block.
///
/// Runs the outline recurrence for every radius from `r` down to 1 with `a`
/// stepping by two. `b` carries over between radii. Coverage is approximate:
/// small gaps between rings can remain.
pub fn circle_fill_points(cx: i32, cy: i32, r: u16) -> Vec<(i32, i32)> {
    let (cx, cy) = (i64::from(cx), i64::from(cy));
    let mut points = Vec::new();

    let mut b = 0i64;
    for radius in (1..=i64::from(r)).rev() {
        let mut a = 0i64;
        while a <= b {
            b = floor_sqrt(radius * radius - a * a);
            if a == 0 {
                b -= 1;
            }
            points.extend(octants(cx, cy, a, b));
            a += 2;
        }
    }
    points
}

fn on_screen(x: i32, y: i32) -> bool {
    (0..WIDTH).contains(&x) && (0..HEIGHT).contains(&y)
}

impl<C: Channel> Session<C> {
    /// Draw a circle outline, one point frame per pixel.
    ///
    /// Points outside the viewport are skipped. Not atomic: the first failed
    /// frame aborts the rest of the circle.
    pub fn draw_circle(&self, color: u16, cx: i32, cy: i32, r: u16) -> Result<()> {
        self.draw_points(&circle_outline_points(cx, cy, r), color, 1)
    }

    /// Fill a circle with 2x2 point blocks. See [`circle_fill_points`] for
    /// the coverage caveat.
    pub fn fill_circle(&self, color: u16, cx: i32, cy: i32, r: u16) -> Result<()> {
        self.draw_points(&circle_fill_points(cx, cy, r), color, 2)
    }

    fn draw_points(&self, points: &[(i32, i32)], color: u16, size: u8) -> Result<()> {
        let mut skipped = 0usize;
        for &(x, y) in points {
            if on_screen(x, y) {
                self.draw_point(color, size, size, x, y)?;
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Skipped {} of {} off-screen points", skipped, points.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::opcode;
    use crate::session::testing::{connected, frames};

    fn distance(p: (i32, i32), c: (i32, i32)) -> f64 {
        let (dx, dy) = (f64::from(p.0 - c.0), f64::from(p.1 - c.1));
        (dx * dx + dy * dy).sqrt()
    }

    #[test]
    fn test_outline_points_lie_on_circle() {
        let points = circle_outline_points(100, 100, 10);
        assert_eq!(points.len(), 64);
        assert_eq!(points.len() % 8, 0);
        for &p in &points {
            let d = distance(p, (100, 100));
            assert!((d - 10.0).abs() <= 1.0, "point {:?} at distance {}", p, d);
        }
    }

    #[test]
    fn test_outline_apex_pulled_in() {
        let points = circle_outline_points(0, 0, 5);
        assert_eq!(&points[..8], &[(0, 4), (4, 0), (4, 0), (0, -4), (0, -4), (-4, 0), (-4, 0), (0, 4)]);
    }

    #[test]
    fn test_zero_radius_draws_nothing() {
        assert!(circle_outline_points(10, 10, 0).is_empty());
        assert!(circle_fill_points(10, 10, 0).is_empty());
    }

    #[test]
    fn test_fill_points_stay_inside() {
        let points = circle_fill_points(50, 60, 8);
        assert!(points.len() > circle_outline_points(50, 60, 8).len());
        for &p in &points {
            assert!(distance(p, (50, 60)) <= 8.0);
        }
    }

    #[test]
    fn test_draw_circle_one_frame_per_point() {
        let (session, wire) = connected();
        session.draw_circle(0xFFFF, 100, 100, 10).unwrap();

        let sent = frames(&wire.written());
        assert_eq!(sent.len(), 64);
        for frame in &sent {
            assert_eq!(&frame[..5], &[opcode::POINT, 0xFF, 0xFF, 1, 1]);
            let x = i32::from(u16::from_be_bytes([frame[5], frame[6]]));
            let y = i32::from(u16::from_be_bytes([frame[7], frame[8]]));
            assert!((distance((x, y), (100, 100)) - 10.0).abs() <= 1.0);
        }
    }

    #[test]
    fn test_fill_circle_uses_blocks() {
        let (session, wire) = connected();
        session.fill_circle(0x07E0, 40, 40, 4).unwrap();
        let sent = frames(&wire.written());
        assert_eq!(sent.len(), circle_fill_points(40, 40, 4).len());
        assert!(sent.iter().all(|f| f[3] == 2 && f[4] == 2));
    }

    #[test]
    fn test_off_screen_points_are_clipped() {
        let (session, wire) = connected();
        session.draw_circle(0xFFFF, 0, 0, 6).unwrap();
        let sent = frames(&wire.written());
        assert!(!sent.is_empty());
        assert!(sent.len() < circle_outline_points(0, 0, 6).len());
    }
}
