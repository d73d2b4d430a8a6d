// Sprite evaluation pipeline
//
// Each visible scanline rebuilds secondary OAM for the *next* scanline: a
// cycle-stepped scan of primary OAM copies up to 8 in-range sprites, then
// the pattern bytes for those sprites are fetched into per-sprite shift
// registers used by the compositor one line later.
//
// The hardware's sprite-overflow detection bug is reproduced: once 8
// sprites have been found, the scanner keeps walking OAM but increments the
// byte index m without carrying into the sprite index n, so tile, attribute
// and X bytes get misread as Y coordinates. The first of those that lands
// in range sets the overflow flag.

use super::constants::{MAX_SPRITES_PER_LINE, SECONDARY_OAM_SIZE};
use super::{Ppu, CTRL_SPRITE_SIZE, CTRL_SPRITE_TABLE, STATUS_SPRITE_OVERFLOW};

impl Ppu {
    /// Sprite height in pixels per the PPUCTRL size bit (8 or 16)
    pub(crate) fn sprite_height(&self) -> i16 {
        if self.ppuctrl & CTRL_SPRITE_SIZE != 0 {
            16
        } else {
            8
        }
    }

    /// Whether an OAM Y byte places `target_scanline` inside the sprite
    ///
    /// OAM stores the top edge minus one, so a sprite with Y byte y covers
    /// scanlines y+1 .. y+height.
    fn sprite_in_range(&self, y_byte: u8, target_scanline: i16) -> bool {
        let row = target_scanline - (y_byte as i16 + 1);
        row >= 0 && row < self.sprite_height()
    }

    /// Drive the per-line sprite machinery for the current dot
    ///
    /// Called on visible and pre-render lines. Evaluation only runs on
    /// visible lines (so scanline 0 never shows sprites, as on hardware);
    /// the pre-render line still clears its state and reloads empty
    /// runtime registers.
    pub(super) fn tick_sprite_pipeline(&mut self, visible: bool, rendering: bool) {
        match self.cycle {
            1 => self.begin_sprite_evaluation(visible, rendering),
            65..=256 => {
                // The scanner looks at one OAM byte every second dot
                if visible && self.cycle & 0x01 != 0 {
                    self.step_sprite_evaluation();
                }
            }
            257 => self.fetch_sprite_patterns(rendering),
            _ => {}
        }
    }

    /// Reset secondary OAM and the evaluation scanner (dot 1)
    fn begin_sprite_evaluation(&mut self, visible: bool, rendering: bool) {
        self.secondary_oam = [0xFF; SECONDARY_OAM_SIZE];
        self.eval_n = 0;
        self.eval_m = 0;
        self.eval_found = 0;
        self.eval_copy = 0;
        self.eval_overflow_scan = false;
        self.sprite_zero_next = false;
        self.eval_done = !(visible && rendering);
    }

    /// One step of the OAM scan (dots 65-255, every second dot)
    fn step_sprite_evaluation(&mut self) {
        if self.eval_done {
            return;
        }
        if !self.rendering_enabled() {
            self.eval_done = true;
            return;
        }
        if self.eval_n as usize >= 64 {
            self.eval_done = true;
            return;
        }

        let target = self.scanline as i16 + 1;
        let byte = self.oam[self.eval_n as usize * 4 + self.eval_m as usize];

        if self.eval_overflow_scan {
            // Buggy post-8 scan: m no longer points at a Y byte
            if self.sprite_in_range(byte, target) {
                self.ppustatus |= STATUS_SPRITE_OVERFLOW;
                self.eval_done = true;
            } else {
                self.eval_n += 1;
                self.eval_m = (self.eval_m + 1) & 0x03;
                if self.eval_n as usize >= 64 {
                    self.eval_done = true;
                }
            }
            return;
        }

        if self.eval_copy > 0 {
            // Copying the remaining bytes of an in-range sprite
            let slot = self.eval_found as usize;
            self.secondary_oam[slot * 4 + self.eval_m as usize] = byte;
            self.eval_m += 1;
            self.eval_copy -= 1;
            if self.eval_copy == 0 {
                self.eval_found += 1;
                self.eval_n += 1;
                self.eval_m = 0;
                if self.eval_n as usize >= 64 {
                    self.eval_done = true;
                }
            }
            return;
        }

        // m == 0: looking at a Y byte
        if self.sprite_in_range(byte, target) {
            if (self.eval_found as usize) < MAX_SPRITES_PER_LINE {
                let slot = self.eval_found as usize;
                self.secondary_oam[slot * 4] = byte;
                if self.eval_n == 0 {
                    self.sprite_zero_next = true;
                }
                self.eval_m = 1;
                self.eval_copy = 3;
            } else {
                // 9th in-range sprite
                self.ppustatus |= STATUS_SPRITE_OVERFLOW;
                self.eval_done = true;
            }
        } else if (self.eval_found as usize) < MAX_SPRITES_PER_LINE {
            self.eval_n += 1;
            if self.eval_n as usize >= 64 {
                self.eval_done = true;
            }
        } else {
            // 8 sprites found and this Y missed: enter the corrupted scan
            self.eval_overflow_scan = true;
            self.eval_n += 1;
            self.eval_m = 1;
            if self.eval_n as usize >= 64 {
                self.eval_done = true;
            }
        }
    }

    /// Load the per-sprite runtime registers from secondary OAM (dot 257)
    ///
    /// Fetches each sprite's pattern row for the next scanline, applying
    /// the 8x16 tile-pair addressing and vertical/horizontal flips.
    fn fetch_sprite_patterns(&mut self, rendering: bool) {
        self.sprite_count = if rendering { self.eval_found } else { 0 };
        self.sprite_zero_line = self.sprite_zero_next && self.sprite_count > 0;

        let target = self.scanline as i16 + 1;
        let height = self.sprite_height();

        for i in 0..MAX_SPRITES_PER_LINE {
            if i >= self.sprite_count as usize {
                self.sprite_pattern_lo[i] = 0;
                self.sprite_pattern_hi[i] = 0;
                self.sprite_attr[i] = 0;
                self.sprite_x[i] = 0xFF;
                continue;
            }

            let y = self.secondary_oam[i * 4];
            let tile = self.secondary_oam[i * 4 + 1];
            let attr = self.secondary_oam[i * 4 + 2];
            let x = self.secondary_oam[i * 4 + 3];

            let mut row = (target - (y as i16 + 1)).clamp(0, height - 1) as u16;
            if attr & 0x80 != 0 {
                // Vertical flip selects the mirrored row
                row = (height as u16 - 1) - row;
            }

            let addr = if height == 16 {
                // 8x16: bit 0 of the tile index selects the pattern table,
                // bits 1-7 select the tile pair
                let table = ((tile & 0x01) as u16) * 0x1000;
                let tile_index = ((tile & 0xFE) as u16) + (row >> 3);
                table + tile_index * 16 + (row & 0x07)
            } else {
                let table = if self.ppuctrl & CTRL_SPRITE_TABLE != 0 {
                    0x1000
                } else {
                    0x0000
                };
                table + (tile as u16) * 16 + (row & 0x07)
            };

            let mut low = self.read_ppu_memory(addr);
            let mut high = self.read_ppu_memory(addr + 8);

            if attr & 0x40 != 0 {
                // Horizontal flip reverses the bit order read into the
                // shift registers
                low = low.reverse_bits();
                high = high.reverse_bits();
            }

            self.sprite_pattern_lo[i] = low;
            self.sprite_pattern_hi[i] = high;
            self.sprite_attr[i] = attr;
            self.sprite_x[i] = x;
        }
    }

    /// Count down sprite X counters and shift active sprite patterns
    ///
    /// Runs once per visible dot in cycles 1-256, after the pixel for that
    /// dot has been sampled.
    pub(super) fn tick_sprite_shifters(&mut self) {
        for i in 0..self.sprite_count as usize {
            if self.sprite_x[i] > 0 {
                self.sprite_x[i] = self.sprite_x[i].wrapping_sub(1);
            } else {
                self.sprite_pattern_lo[i] <<= 1;
                self.sprite_pattern_hi[i] <<= 1;
            }
        }
    }
}
