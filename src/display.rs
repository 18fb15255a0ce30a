pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// The 64x32 monochrome pixel buffer, row-major.
pub struct FrameBuffer {
    pixels: [bool; WIDTH * HEIGHT],
    needs_redraw: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [false; WIDTH * HEIGHT],
            needs_redraw: false,
        }
    }

    pub fn clear_buffer(&mut self) {
        self.pixels = [false; WIDTH * HEIGHT];
        self.needs_redraw = true;
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y * WIDTH + x]
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Called by the renderer once it has consumed a frame.
    pub fn mark_drawn(&mut self) {
        self.needs_redraw = false;
    }

    /// XORs `sprite` onto the buffer with its top-left corner at (x, y).
    ///
    /// Only the origin wraps; rows and columns running off the right or
    /// bottom edge are clipped. Returns true if any lit sprite bit landed on
    /// a pixel that was already on.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x0, y0) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut collision = false;

        for (i, row) in sprite.iter().enumerate() {
            let ny = y0 + i;
            if ny >= HEIGHT {
                break;
            }
            for j in 0..8 {
                let nx = x0 + j;
                if nx >= WIDTH {
                    break;
                }
                if (row >> (7 - j)) & 1 == 0 {
                    continue;
                }
                let index = ny * WIDTH + nx;
                collision |= self.pixels[index];
                self.pixels[index] ^= true;
            }
        }

        self.needs_redraw = true;
        collision
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &FrameBuffer) -> usize {
        fb.pixels().iter().filter(|&&p| p).count()
    }

    #[test]
    fn paints_msb_first() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.paint(0, 0, &[0b1000_0001]));
        assert!(fb.get(0, 0));
        assert!(fb.get(7, 0));
        assert!(!fb.get(1, 0));
        assert_eq!(lit(&fb), 2);
    }

    #[test]
    fn origin_wraps_but_rows_clip() {
        let mut fb = FrameBuffer::new();
        // 70 % 64 = 6, 33 % 32 = 1
        fb.paint(70, 33, &[0xFF]);
        assert!(fb.get(6, 1));
        assert!(fb.get(13, 1));
        assert_eq!(lit(&fb), 8);

        let mut fb = FrameBuffer::new();
        fb.paint(60, 30, &[0xFF, 0xFF, 0xFF, 0xFF]);
        // 4 columns x 2 rows survive, nothing wraps to the left or top
        assert_eq!(lit(&fb), 8);
        assert!(!fb.get(0, 30));
        assert!(!fb.get(60, 0));
    }

    #[test]
    fn collision_spans_the_whole_sprite() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0x80]);
        // first row collides, second row does not; flag must stick
        assert!(fb.paint(0, 0, &[0x80, 0x40]));
        assert!(!fb.get(0, 0));
        assert!(fb.get(1, 1));
    }

    #[test]
    fn unlit_bits_never_collide() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xFF]);
        assert!(!fb.paint(0, 0, &[0x00]));
        assert_eq!(lit(&fb), 8);
    }

    #[test]
    fn drawing_twice_restores_buffer() {
        let mut fb = FrameBuffer::new();
        fb.paint(3, 3, &[0x3C]);
        let before = fb.pixels().to_vec();
        let sprite = [0xF0, 0x90, 0xF0];
        fb.paint(10, 5, &sprite);
        fb.paint(10, 5, &sprite);
        assert_eq!(fb.pixels(), &before[..]);
    }

    #[test]
    fn paint_always_requests_redraw() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[]);
        assert!(fb.needs_redraw());
        fb.mark_drawn();
        assert!(!fb.needs_redraw());
    }

    #[test]
    fn clear_blanks_and_requests_redraw() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xFF; 5]);
        fb.mark_drawn();
        fb.clear_buffer();
        assert_eq!(lit(&fb), 0);
        assert!(fb.needs_redraw());
    }
}
