// PPU module - Picture Processing Unit (2C02) emulation
//
// The PPU is a fixed-function co-processor clocked at 3x the CPU rate. It
// renders one pixel per cycle during the visible portion of the frame,
// driven entirely by the (scanline, cycle) counter pair. All CPU-visible
// behavior (register side effects, NMI timing, scroll counter reloads) is
// keyed to exact dot coordinates.

pub mod constants;
mod memory;
mod registers;
mod rendering;
mod sprites;

#[cfg(test)]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

use crate::cartridge::{Mapper, Mirroring};
use crate::display::FrameBuffer;
use constants::{
    CYCLES_PER_SCANLINE, FIRST_VBLANK_SCANLINE, LAST_VISIBLE_SCANLINE, MAX_SPRITES_PER_LINE,
    OAM_SIZE, PALETTE_SIZE, PRERENDER_SCANLINE, SECONDARY_OAM_SIZE, VRAM_SIZE,
};

// PPUCTRL bits
pub(crate) const CTRL_NMI_ENABLE: u8 = 0x80;
pub(crate) const CTRL_SPRITE_SIZE: u8 = 0x20;
pub(crate) const CTRL_BG_TABLE: u8 = 0x10;
pub(crate) const CTRL_SPRITE_TABLE: u8 = 0x08;
pub(crate) const CTRL_INCREMENT_32: u8 = 0x04;

// PPUMASK bits
pub(crate) const MASK_SHOW_SPRITES: u8 = 0x10;
pub(crate) const MASK_SHOW_BG: u8 = 0x08;
pub(crate) const MASK_SHOW_SPRITES_LEFT: u8 = 0x04;
pub(crate) const MASK_SHOW_BG_LEFT: u8 = 0x02;

// PPUSTATUS bits
pub(crate) const STATUS_VBLANK: u8 = 0x80;
pub(crate) const STATUS_SPRITE_ZERO_HIT: u8 = 0x40;
pub(crate) const STATUS_SPRITE_OVERFLOW: u8 = 0x20;

/// PPU structure representing the complete Picture Processing Unit state
///
/// Owned as a plain value; the driver steps it three times per CPU cycle and
/// polls `take_nmi()` for the interrupt edge. All memory the PPU owns (VRAM,
/// palette, OAM) is fixed-size and allocated once at construction.
pub struct Ppu {
    // CPU-visible registers
    pub(crate) ppuctrl: u8,
    pub(crate) ppumask: u8,
    pub(crate) ppustatus: u8,
    pub(crate) oam_addr: u8,

    // Internal scroll/address state ("loopy" registers)
    /// Current VRAM address (15 bits: fine-y, nametable, coarse-y, coarse-x)
    pub(crate) v: u16,
    /// Temporary VRAM address, reloaded into v at fixed frame points
    pub(crate) t: u16,
    /// Fine X scroll (3 bits)
    pub(crate) fine_x: u8,
    /// Shared first/second write toggle for PPUSCROLL and PPUADDR
    pub(crate) write_latch: bool,
    /// Internal PPUDATA read buffer (one-read delay)
    pub(crate) read_buffer: u8,

    // Background fetch pipeline
    pub(crate) next_tile_id: u8,
    pub(crate) next_tile_attr: u8,
    pub(crate) next_tile_lsb: u8,
    pub(crate) next_tile_msb: u8,
    pub(crate) bg_shift_pattern_lo: u16,
    pub(crate) bg_shift_pattern_hi: u16,
    pub(crate) bg_shift_attr_lo: u16,
    pub(crate) bg_shift_attr_hi: u16,

    // Sprite memory and evaluation state
    pub(crate) oam: [u8; OAM_SIZE],
    pub(crate) secondary_oam: [u8; SECONDARY_OAM_SIZE],
    /// Primary OAM sprite index being evaluated (n)
    pub(crate) eval_n: u8,
    /// Byte-within-sprite index (m); increments without carry in the
    /// hardware's buggy overflow scan
    pub(crate) eval_m: u8,
    /// Sprites copied into secondary OAM so far
    pub(crate) eval_found: u8,
    /// Remaining bytes of an in-progress sprite copy
    pub(crate) eval_copy: u8,
    pub(crate) eval_done: bool,
    /// The diagonal OAM walk entered after the 8th in-range sprite
    pub(crate) eval_overflow_scan: bool,
    /// Secondary OAM slot 0 holds primary OAM sprite 0 (next scanline)
    pub(crate) sprite_zero_next: bool,
    /// Secondary OAM slot 0 held sprite 0 when the current line was fetched
    pub(crate) sprite_zero_line: bool,

    // Per-sprite runtime registers for the line being rendered
    pub(crate) sprite_count: u8,
    pub(crate) sprite_pattern_lo: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) sprite_pattern_hi: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) sprite_attr: [u8; MAX_SPRITES_PER_LINE],
    pub(crate) sprite_x: [u8; MAX_SPRITES_PER_LINE],

    // Video memory owned by the PPU
    pub(crate) vram: [u8; VRAM_SIZE],
    pub(crate) palette_ram: [u8; PALETTE_SIZE],

    // Timing
    pub(crate) scanline: u16,
    pub(crate) cycle: u16,
    pub(crate) frame: u64,
    pub(crate) odd_frame: bool,

    // NMI edge toward the CPU
    pub(crate) nmi_pending: bool,
    /// True only for the dot on which the vblank flag was set; a PPUSTATUS
    /// read in that window suppresses the NMI (hardware race)
    pub(crate) vblank_just_set: bool,

    pub(crate) frame_buffer: FrameBuffer,
    pub(crate) mapper: Option<Rc<RefCell<Box<dyn Mapper>>>>,
    pub(crate) mirroring: Mirroring,
}

impl Ppu {
    /// Create a new PPU in its power-on state
    ///
    /// VRAM, OAM and palette RAM are undefined on real hardware; they are
    /// deterministically zero-filled here.
    pub fn new() -> Self {
        Ppu {
            ppuctrl: 0,
            ppumask: 0,
            ppustatus: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            read_buffer: 0,
            next_tile_id: 0,
            next_tile_attr: 0,
            next_tile_lsb: 0,
            next_tile_msb: 0,
            bg_shift_pattern_lo: 0,
            bg_shift_pattern_hi: 0,
            bg_shift_attr_lo: 0,
            bg_shift_attr_hi: 0,
            oam: [0; OAM_SIZE],
            secondary_oam: [0; SECONDARY_OAM_SIZE],
            eval_n: 0,
            eval_m: 0,
            eval_found: 0,
            eval_copy: 0,
            eval_done: true,
            eval_overflow_scan: false,
            sprite_zero_next: false,
            sprite_zero_line: false,
            sprite_count: 0,
            sprite_pattern_lo: [0; MAX_SPRITES_PER_LINE],
            sprite_pattern_hi: [0; MAX_SPRITES_PER_LINE],
            sprite_attr: [0; MAX_SPRITES_PER_LINE],
            sprite_x: [0; MAX_SPRITES_PER_LINE],
            vram: [0; VRAM_SIZE],
            palette_ram: [0; PALETTE_SIZE],
            scanline: 0,
            cycle: 0,
            frame: 0,
            odd_frame: false,
            nmi_pending: false,
            vblank_just_set: false,
            frame_buffer: FrameBuffer::new(),
            mapper: None,
            mirroring: Mirroring::Horizontal,
        }
    }

    /// Attach the cartridge mapper and adopt its mirroring mode
    pub fn set_mapper(&mut self, mapper: Rc<RefCell<Box<dyn Mapper>>>) {
        self.mirroring = mapper.borrow().mirroring();
        self.mapper = Some(mapper);
    }

    /// Override the nametable mirroring mode
    ///
    /// Normally taken from the mapper; exposed for drivers and tests that
    /// run the PPU without a cartridge.
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    /// Reset the PPU to its documented post-reset state
    ///
    /// Clears control/mask/status, the write toggle, the scroll/address
    /// latches and the rendering pipeline, and restarts the frame at dot
    /// (0, 0). VRAM, OAM and palette contents survive, as on real hardware.
    pub fn reset(&mut self) {
        log::debug!("ppu reset");

        self.ppuctrl = 0;
        self.ppumask = 0;
        self.ppustatus = 0;
        self.v = 0;
        self.t = 0;
        self.fine_x = 0;
        self.write_latch = false;
        self.read_buffer = 0;

        self.next_tile_id = 0;
        self.next_tile_attr = 0;
        self.next_tile_lsb = 0;
        self.next_tile_msb = 0;
        self.bg_shift_pattern_lo = 0;
        self.bg_shift_pattern_hi = 0;
        self.bg_shift_attr_lo = 0;
        self.bg_shift_attr_hi = 0;

        self.eval_done = true;
        self.eval_overflow_scan = false;
        self.sprite_zero_next = false;
        self.sprite_zero_line = false;
        self.sprite_count = 0;

        self.scanline = 0;
        self.cycle = 0;
        self.odd_frame = false;
        self.nmi_pending = false;
        self.vblank_just_set = false;
    }

    /// Advance the PPU by exactly one cycle
    ///
    /// Returns `true` when this cycle completed a frame (the dot counter
    /// wrapped from the pre-render line back to scanline 0).
    pub fn step(&mut self) -> bool {
        // The vblank-set race window only covers the dot it was set on.
        self.vblank_just_set = false;

        // NTSC odd-frame skip: with rendering enabled, the pre-render line
        // of every other frame is one cycle short.
        let skip_dot = self.scanline == PRERENDER_SCANLINE
            && self.cycle == CYCLES_PER_SCANLINE - 2
            && self.odd_frame
            && self.rendering_enabled();

        let mut frame_complete = false;
        if skip_dot || self.cycle == CYCLES_PER_SCANLINE - 1 {
            self.cycle = 0;
            if self.scanline == PRERENDER_SCANLINE {
                self.scanline = 0;
                self.frame = self.frame.wrapping_add(1);
                self.odd_frame = !self.odd_frame;
                frame_complete = true;
                log::trace!("frame {} complete", self.frame);
            } else {
                self.scanline += 1;
            }
        } else {
            self.cycle += 1;
        }

        self.tick_dot();
        frame_complete
    }

    /// Apply the side effects keyed to the current (scanline, cycle) dot
    fn tick_dot(&mut self) {
        let visible = self.scanline <= LAST_VISIBLE_SCANLINE;
        let pre_render = self.scanline == PRERENDER_SCANLINE;
        let render_line = visible || pre_render;
        let rendering = self.rendering_enabled();

        if pre_render && self.cycle == 1 {
            self.ppustatus &=
                !(STATUS_VBLANK | STATUS_SPRITE_ZERO_HIT | STATUS_SPRITE_OVERFLOW);
        }

        if self.scanline == FIRST_VBLANK_SCANLINE && self.cycle == 1 {
            self.ppustatus |= STATUS_VBLANK;
            self.vblank_just_set = true;
            if self.ppuctrl & CTRL_NMI_ENABLE != 0 {
                self.nmi_pending = true;
            }
        }

        if render_line && rendering {
            self.tick_background();
        }

        // Pixel output samples the shifters after this dot's shift. The
        // phase-0 reload only refills the low bytes, below the sample window.
        if visible && (1..=256).contains(&self.cycle) {
            self.composite_pixel();
        }

        if visible && rendering && (1..=256).contains(&self.cycle) {
            self.tick_sprite_shifters();
        }

        if render_line {
            self.tick_sprite_pipeline(visible, rendering);
        }
    }

    /// Whether background or sprite rendering is enabled in PPUMASK
    pub(crate) fn rendering_enabled(&self) -> bool {
        self.ppumask & (MASK_SHOW_BG | MASK_SHOW_SPRITES) != 0
    }

    /// Current scanline (0-261)
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current cycle within the scanline (0-340)
    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    /// Number of completed frames since power-on
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Odd/even frame parity (toggles once per frame)
    pub fn odd_frame(&self) -> bool {
        self.odd_frame
    }

    /// The frame buffer for the frame in progress (or just completed)
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    /// Whether an NMI edge is queued toward the CPU
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Consume the queued NMI edge, if any
    ///
    /// The driver polls this once per CPU step and delivers the interrupt
    /// itself; the PPU never calls upward.
    pub fn take_nmi(&mut self) -> bool {
        let pending = self.nmi_pending;
        self.nmi_pending = false;
        pending
    }

    /// Read a byte from primary OAM (testing/tooling path)
    pub fn read_oam(&self, index: u8) -> u8 {
        self.oam[index as usize]
    }

    /// Write a byte to primary OAM (testing/tooling path)
    pub fn write_oam(&mut self, index: u8, value: u8) {
        self.oam[index as usize] = value;
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
