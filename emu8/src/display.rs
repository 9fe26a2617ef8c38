//! Monochrome display buffer.
use crate::constants::*;

/// Screen buffer that sprites are drawn to.
///
/// Stored row-major, so pixel `(x, y)` lives at `x + y * DISPLAY_WIDTH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer(Box<[bool; DISPLAY_BUFFER_SIZE]>);

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self(Box::new([false; DISPLAY_BUFFER_SIZE]))
    }
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// Set every pixel to unset.
    pub fn clear(&mut self) {
        self.0.fill(false);
    }

    /// State of the pixel at the given coordinate, wrapped to the screen size.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.0[index(x, y)]
    }

    pub fn as_slice(&self) -> &[bool; DISPLAY_BUFFER_SIZE] {
        &self.0
    }

    /// Iterate the screen one row at a time, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.0.chunks(DISPLAY_WIDTH)
    }

    /// Number of pixels currently set.
    pub fn lit(&self) -> usize {
        self.0.iter().filter(|px| **px).count()
    }

    /// XOR a sprite onto the screen with its top left corner at `(x, y)`.
    ///
    /// Each byte of `sprite` is one row of 8 pixels, most significant bit
    /// on the left. Rows and columns that fall off the screen wrap around
    /// to the other side.
    ///
    /// Returns `true` when any pixel was erased, which is how programs
    /// detect collisions.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: impl IntoIterator<Item = u8>) -> bool {
        let mut is_erased = false;

        for (r, row) in sprite.into_iter().enumerate() {
            for c in 0..SPRITE_WIDTH {
                let d = index(x + c, y + r);

                let old_px = self.0[d];
                let new_px = (row >> (7 - c) & 1) != 0;

                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= old_px && new_px;

                self.0[d] = old_px ^ new_px;
            }
        }

        is_erased
    }
}

#[inline(always)]
fn index(x: usize, y: usize) -> usize {
    (x % DISPLAY_WIDTH) + (y % DISPLAY_HEIGHT) * DISPLAY_WIDTH
}
