// PPU constants

/// PPU register address mask for mirroring
///
/// PPU registers are 8 bytes ($2000-$2007) but mirrored throughout $2000-$3FFF.
/// Use this mask to get the actual register index: `addr & 0x0007`
pub(crate) const PPU_REGISTER_MASK: u16 = 0x0007;

/// Size of one nametable in bytes (1KB)
pub(crate) const NAMETABLE_SIZE: usize = 1024;

/// Size of internal VRAM in bytes (4 logical nametables)
///
/// Only the first 2KB exists on the console itself; the upper 2KB stands in
/// for cartridge-supplied VRAM in four-screen mode.
pub(crate) const VRAM_SIZE: usize = 4 * NAMETABLE_SIZE;

/// Size of palette RAM in bytes
pub(crate) const PALETTE_SIZE: usize = 32;

/// Size of primary OAM in bytes (64 sprites × 4 bytes)
pub(crate) const OAM_SIZE: usize = 256;

/// Size of secondary OAM in bytes (8 sprites × 4 bytes)
pub(crate) const SECONDARY_OAM_SIZE: usize = 32;

/// Maximum sprites rendered per scanline
pub(crate) const MAX_SPRITES_PER_LINE: usize = 8;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// Number of PPU cycles per scanline
pub(crate) const CYCLES_PER_SCANLINE: u16 = 341;

/// Number of scanlines per frame (NTSC)
pub(crate) const SCANLINES_PER_FRAME: u16 = 262;

/// Total PPU cycles per frame (NTSC)
/// 341 cycles/scanline × 262 scanlines = 89,342 cycles
#[allow(dead_code)]
pub(crate) const CYCLES_PER_FRAME: u32 =
    (CYCLES_PER_SCANLINE as u32) * (SCANLINES_PER_FRAME as u32);

/// Pre-render scanline number
/// This is scanline 261 (or -1 in some documentation)
pub(crate) const PRERENDER_SCANLINE: u16 = 261;

/// Last visible scanline
pub(crate) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// First VBlank scanline
pub(crate) const FIRST_VBLANK_SCANLINE: u16 = 241;
