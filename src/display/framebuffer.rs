// Frame Buffer - Stores pixel data for NES display output
//
// The NES has a resolution of 256×240 pixels. Each pixel is represented
// by a palette index (0-63) which maps to an RGB color.

use super::palette::palette_to_rgba;

/// NES screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// NES screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Total number of pixels in the frame buffer
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Frame buffer for storing pixel data
///
/// Stores palette indices for each pixel (256×240 = 61,440 pixels).
/// The PPU writes exactly one pixel per visible cycle; the host reads the
/// buffer only between frames (after the frame-complete signal).
pub struct FrameBuffer {
    /// Pixel data stored as palette indices (0-63)
    pixels: [u8; SCREEN_SIZE],
}

impl FrameBuffer {
    /// Create a new frame buffer initialized to black (palette index 0x0F)
    pub fn new() -> Self {
        Self {
            pixels: [0x0F; SCREEN_SIZE],
        }
    }

    /// Set a pixel at the given coordinates
    ///
    /// # Arguments
    /// * `x` - X coordinate (0-255)
    /// * `y` - Y coordinate (0-239)
    /// * `palette_index` - Palette index (0-63)
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, palette_index: u8) {
        assert!(x < SCREEN_WIDTH, "X coordinate {} out of bounds", x);
        assert!(y < SCREEN_HEIGHT, "Y coordinate {} out of bounds", y);

        self.pixels[y * SCREEN_WIDTH + x] = palette_index & 0x3F;
    }

    /// Get a pixel at the given coordinates
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < SCREEN_WIDTH, "X coordinate {} out of bounds", x);
        assert!(y < SCREEN_HEIGHT, "Y coordinate {} out of bounds", y);

        self.pixels[y * SCREEN_WIDTH + x]
    }

    /// Clear the frame buffer to a specific palette index
    pub fn clear(&mut self, palette_index: u8) {
        self.pixels.fill(palette_index & 0x3F);
    }

    /// Get the raw pixel data as palette indices
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// Convert the frame buffer to RGBA bytes (256×240×4)
    ///
    /// Suitable for handing straight to a texture upload or PNG encoder.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(SCREEN_SIZE * 4);
        for &index in self.pixels.iter() {
            rgba.extend_from_slice(&palette_to_rgba(index));
        }
        rgba
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

    #[test]
    fn test_framebuffer_starts_black() {
        let fb = FrameBuffer::new();
        assert!(fb.as_slice().iter().all(|&p| p == 0x0F));
    }

    #[test]
    fn test_set_and_get_pixel() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(10, 20, 0x21);
        assert_eq!(fb.get_pixel(10, 20), 0x21);
    }

    #[test]
    fn test_set_pixel_masks_to_63() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(0, 0, 0xFF);
        assert_eq!(fb.get_pixel(0, 0), 0x3F);
    }

    #[test]
    fn test_to_rgba_length() {
        let fb = FrameBuffer::new();
        assert_eq!(fb.to_rgba().len(), SCREEN_SIZE * 4);
    }
}
