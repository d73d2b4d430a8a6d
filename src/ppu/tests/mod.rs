//! PPU unit tests
//!
//! Organized by functionality: register semantics, memory/mirroring,
//! timing, background rendering, sprite evaluation, and hardware quirks.

pub(crate) use super::*;
pub(crate) use crate::bus::MemoryMappedDevice;
pub(crate) use crate::cartridge::{ChrRom, Mapper, Mirroring};
pub(crate) use std::cell::RefCell;
pub(crate) use std::rc::Rc;

pub(crate) use super::constants::CYCLES_PER_FRAME;

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

/// PPU Control Register ($2000) - Write only
pub(crate) const PPUCTRL: u16 = 0x2000;
/// PPU Mask Register ($2001) - Write only
pub(crate) const PPUMASK: u16 = 0x2001;
/// PPU Status Register ($2002) - Read only
pub(crate) const PPUSTATUS: u16 = 0x2002;
/// OAM Address Port ($2003) - Write only
pub(crate) const OAMADDR: u16 = 0x2003;
/// OAM Data Port ($2004) - Read/Write
pub(crate) const OAMDATA: u16 = 0x2004;
/// Scroll Position Register ($2005) - Write×2
pub(crate) const PPUSCROLL: u16 = 0x2005;
/// PPU Address Register ($2006) - Write×2
pub(crate) const PPUADDR: u16 = 0x2006;
/// PPU Data Port ($2007) - Read/Write
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helper Functions
// ========================================

/// CHR bank where every tile is solid color 3 (both bitplanes all ones)
pub(crate) fn solid_chr() -> Vec<u8> {
    vec![0xFF; 8 * 1024]
}

/// Create a PPU with the given CHR-ROM attached
pub(crate) fn ppu_with_chr(chr: Vec<u8>, mirroring: Mirroring) -> Ppu {
    let mut ppu = Ppu::new();
    let mapper = ChrRom::new_rom(chr, mirroring).expect("test CHR must be 8KB");
    let mapper_rc = Rc::new(RefCell::new(Box::new(mapper) as Box<dyn Mapper>));
    ppu.set_mapper(mapper_rc);
    ppu
}

/// Step the PPU until it sits at the given dot
///
/// Panics if the dot is not reached within two frames.
pub(crate) fn advance_to_dot(ppu: &mut Ppu, scanline: u16, cycle: u16) {
    for _ in 0..(CYCLES_PER_FRAME * 2) {
        if ppu.scanline == scanline && ppu.cycle == cycle {
            return;
        }
        ppu.step();
    }
    panic!("dot ({}, {}) never reached", scanline, cycle);
}

/// Set the VRAM address through the PPUADDR port
pub(crate) fn set_vram_addr(ppu: &mut Ppu, addr: u16) {
    ppu.write(PPUADDR, (addr >> 8) as u8);
    ppu.write(PPUADDR, (addr & 0xFF) as u8);
}

// ========================================
// Test Modules
// ========================================

mod quirks;
mod sprites;
