//! In-place scrolling inside the scroll rectangle

use super::Sprite;

impl Sprite {
    /// Shift the content of the scroll rectangle by (dx, dy)
    ///
    /// Pixels that scroll in from outside the rectangle are set to `fill`;
    /// pixels outside the rectangle are never touched. Rows and columns
    /// are walked against the shift direction so every source pixel is
    /// read before it is overwritten.
    pub fn scroll(&mut self, dx: i32, dy: i32, fill: u32) {
        let area = self.scroll;
        if area.is_empty() || (dx == 0 && dy == 0) {
            return;
        }
        trace!("scroll {} {}", dx, dy);
        // A shift past the edge vacates the whole rectangle
        let dx = dx.clamp(-area.w, area.w);
        let dy = dy.clamp(-area.h, area.h);

        for row in 0..area.h {
            let y = if dy > 0 {
                area.bottom() - 1 - row
            } else {
                area.y + row
            };
            for col in 0..area.w {
                let x = if dx > 0 {
                    area.right() - 1 - col
                } else {
                    area.x + col
                };
                let (sx, sy) = (x - dx, y - dy);
                let raw = if area.contains(sx, sy) {
                    self.read_at(sx, sy)
                } else {
                    fill
                };
                self.write_at(x, y, raw);
            }
        }
    }
}
