// PPU background pipeline and pixel compositing
//
// The background is produced by four 16-bit shift registers fed from an
// 8-cycle fetch cadence (nametable byte, attribute byte, pattern low byte,
// pattern high byte). The scroll counters in v advance in lockstep with the
// fetches, with the hardware's wrap quirks: coarse X wraps at 31 toggling
// the horizontal nametable bit, coarse Y wraps at 29 toggling the vertical
// bit, and a coarse Y of 30/31 (written through $2005 abuse) wraps silently
// into the attribute rows.

use super::{
    Ppu, CTRL_BG_TABLE, MASK_SHOW_BG, MASK_SHOW_BG_LEFT, MASK_SHOW_SPRITES,
    MASK_SHOW_SPRITES_LEFT, STATUS_SPRITE_ZERO_HIT,
};

impl Ppu {
    /// Run the background fetch/shift cadence for the current dot
    ///
    /// Called on visible and pre-render lines while rendering is enabled.
    pub(super) fn tick_background(&mut self) {
        let pre_render = self.scanline == super::constants::PRERENDER_SCANLINE;

        if (1..=256).contains(&self.cycle) || (321..=336).contains(&self.cycle) {
            self.shift_background_registers();

            match (self.cycle - 1) & 0x07 {
                0 => {
                    self.load_background_shifters();
                    self.next_tile_id = self.read_ppu_memory(0x2000 | (self.v & 0x0FFF));
                }
                2 => {
                    // Attribute byte for the 4x4-tile area around v
                    let addr = 0x23C0
                        | (self.v & 0x0C00)
                        | ((self.v >> 4) & 0x0038)
                        | ((self.v >> 2) & 0x0007);
                    let attr = self.read_ppu_memory(addr);
                    let shift = ((self.v >> 4) & 0x04) | (self.v & 0x02);
                    self.next_tile_attr = (attr >> shift) & 0x03;
                }
                4 => {
                    let addr = self.bg_pattern_addr();
                    self.next_tile_lsb = self.read_ppu_memory(addr);
                }
                6 => {
                    let addr = self.bg_pattern_addr() + 8;
                    self.next_tile_msb = self.read_ppu_memory(addr);
                }
                7 => self.increment_coarse_x(),
                _ => {}
            }
        }

        if self.cycle == 256 {
            self.increment_coarse_y();
        }

        if self.cycle == 257 {
            self.load_background_shifters();
            self.copy_horizontal_bits();
        }

        if pre_render && (280..=304).contains(&self.cycle) {
            self.copy_vertical_bits();
        }

        // Dummy nametable fetches at the end of the line
        if self.cycle == 338 || self.cycle == 340 {
            self.next_tile_id = self.read_ppu_memory(0x2000 | (self.v & 0x0FFF));
        }
    }

    /// Pattern table address for the current tile row
    fn bg_pattern_addr(&self) -> u16 {
        let table = if self.ppuctrl & CTRL_BG_TABLE != 0 {
            0x1000
        } else {
            0x0000
        };
        let fine_y = (self.v >> 12) & 0x07;
        table + (self.next_tile_id as u16) * 16 + fine_y
    }

    fn shift_background_registers(&mut self) {
        self.bg_shift_pattern_lo <<= 1;
        self.bg_shift_pattern_hi <<= 1;
        self.bg_shift_attr_lo <<= 1;
        self.bg_shift_attr_hi <<= 1;
    }

    /// Reload the low halves of the shifters from the fetch latches
    ///
    /// The attribute bits are expanded to a full byte so the same fine-x
    /// mux selects pattern and palette-group bits together.
    fn load_background_shifters(&mut self) {
        self.bg_shift_pattern_lo =
            (self.bg_shift_pattern_lo & 0xFF00) | self.next_tile_lsb as u16;
        self.bg_shift_pattern_hi =
            (self.bg_shift_pattern_hi & 0xFF00) | self.next_tile_msb as u16;

        let attr_lo = if self.next_tile_attr & 0x01 != 0 { 0xFF } else { 0x00 };
        let attr_hi = if self.next_tile_attr & 0x02 != 0 { 0xFF } else { 0x00 };
        self.bg_shift_attr_lo = (self.bg_shift_attr_lo & 0xFF00) | attr_lo;
        self.bg_shift_attr_hi = (self.bg_shift_attr_hi & 0xFF00) | attr_hi;
    }

    /// Increment coarse X in v, toggling the horizontal nametable at 31
    pub(crate) fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v = self.v.wrapping_add(1);
        }
    }

    /// Increment fine Y in v, carrying into coarse Y
    ///
    /// Coarse Y wraps at 29 (tile row 30 onward is attribute territory)
    /// toggling the vertical nametable bit; a coarse Y of 31 wraps to 0
    /// without the toggle.
    pub(crate) fn increment_coarse_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v = self.v.wrapping_add(0x1000);
            return;
        }

        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        if coarse_y == 29 {
            coarse_y = 0;
            self.v ^= 0x0800;
        } else if coarse_y == 31 {
            coarse_y = 0;
        } else {
            coarse_y += 1;
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }

    /// Copy the horizontal scroll bits (coarse X, horizontal nametable)
    /// from t into v
    pub(crate) fn copy_horizontal_bits(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    /// Copy the vertical scroll bits (fine Y, coarse Y, vertical nametable)
    /// from t into v
    pub(crate) fn copy_vertical_bits(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }

    /// Sample the background shifters at the current fine-x offset
    ///
    /// Returns (pixel, palette). Pixel 0 is transparent.
    fn background_sample(&self, x: usize) -> (u8, u8) {
        if self.ppumask & MASK_SHOW_BG == 0 {
            return (0, 0);
        }
        if x < 8 && self.ppumask & MASK_SHOW_BG_LEFT == 0 {
            return (0, 0);
        }

        let bit = 0x8000u16 >> self.fine_x;

        let p0 = (self.bg_shift_pattern_lo & bit != 0) as u8;
        let p1 = (self.bg_shift_pattern_hi & bit != 0) as u8;
        let pixel = (p1 << 1) | p0;

        let a0 = (self.bg_shift_attr_lo & bit != 0) as u8;
        let a1 = (self.bg_shift_attr_hi & bit != 0) as u8;
        let palette = (a1 << 1) | a0;

        (pixel, palette)
    }

    /// Sample the first in-range sprite with an opaque pixel
    ///
    /// Returns (pixel, palette, behind_background, is_sprite_zero).
    fn sprite_sample(&self, x: usize) -> (u8, u8, bool, bool) {
        if self.ppumask & MASK_SHOW_SPRITES == 0 {
            return (0, 0, false, false);
        }
        if x < 8 && self.ppumask & MASK_SHOW_SPRITES_LEFT == 0 {
            return (0, 0, false, false);
        }

        for i in 0..self.sprite_count as usize {
            // A sprite becomes active once its X counter has run down
            if self.sprite_x[i] != 0 {
                continue;
            }

            let p0 = (self.sprite_pattern_lo[i] & 0x80) >> 7;
            let p1 = (self.sprite_pattern_hi[i] & 0x80) >> 6;
            let pixel = p1 | p0;
            if pixel == 0 {
                continue;
            }

            let palette = self.sprite_attr[i] & 0x03;
            let behind = self.sprite_attr[i] & 0x20 != 0;
            let is_zero = i == 0 && self.sprite_zero_line;
            return (pixel, palette, behind, is_zero);
        }

        (0, 0, false, false)
    }

    /// Composite one pixel and write it to the frame buffer
    ///
    /// Runs on every visible dot in cycles 1-256 regardless of whether
    /// rendering is enabled, so each frame writes each pixel exactly once;
    /// with rendering disabled every pixel is the backdrop color.
    pub(super) fn composite_pixel(&mut self) {
        let x = (self.cycle - 1) as usize;
        let y = self.scanline as usize;

        let (bg_pixel, bg_palette) = self.background_sample(x);
        let (sp_pixel, sp_palette, sp_behind, sp_is_zero) = self.sprite_sample(x);

        // Sprite zero hit: opaque sprite-0 pixel over an opaque background
        // pixel, never at x=255. Both samples already honor the enable and
        // left-edge mask bits.
        if sp_is_zero && sp_pixel != 0 && bg_pixel != 0 && x != 255 {
            self.ppustatus |= STATUS_SPRITE_ZERO_HIT;
        }

        // Priority mux: the sprite wins unless it is transparent buried
        // behind an opaque background pixel.
        let frame_palette_index = if sp_pixel != 0 && (bg_pixel == 0 || !sp_behind) {
            0x10 | (sp_palette << 2) | sp_pixel
        } else if bg_pixel != 0 {
            (bg_palette << 2) | bg_pixel
        } else {
            0
        };

        let color = self.palette_color(frame_palette_index);
        self.frame_buffer.set_pixel(x, y, color);
    }
}
