// Save state functionality
//
// Captures the complete PPU state - registers, scroll counters, pipeline
// latches, OAM, secondary OAM, sprite runtime registers, VRAM and palette -
// verbatim, so a restored PPU is cycle-for-cycle identical to the captured
// one.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::ppu::Ppu;

/// Errors that can occur during save state operations
#[derive(Debug)]
pub enum SaveStateError {
    /// I/O error
    Io(io::Error),

    /// Serialization/deserialization error
    Serialization(serde_json::Error),

    /// Save state version mismatch
    VersionMismatch { expected: u32, found: u32 },

    /// A memory block in the state has the wrong length
    CorruptState(String),
}

impl std::fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStateError::Io(e) => write!(f, "I/O error: {}", e),
            SaveStateError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SaveStateError::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
            SaveStateError::CorruptState(msg) => write!(f, "Corrupt save state: {}", msg),
        }
    }
}

impl std::error::Error for SaveStateError {}

impl From<io::Error> for SaveStateError {
    fn from(e: io::Error) -> Self {
        SaveStateError::Io(e)
    }
}

impl From<serde_json::Error> for SaveStateError {
    fn from(e: serde_json::Error) -> Self {
        SaveStateError::Serialization(e)
    }
}

/// Current save state format version
const SAVE_STATE_VERSION: u32 = 1;

/// Complete PPU save state
///
/// Contains every field of the PPU visible to software or to the rendering
/// pipeline. Cartridge CHR contents are the mapper's concern and are not
/// captured here.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveState {
    /// Version number for compatibility checking
    version: u32,

    /// Timestamp when the save state was created
    timestamp: String,

    // CPU-visible registers
    ppuctrl: u8,
    ppumask: u8,
    ppustatus: u8,
    oam_addr: u8,

    // Loopy state
    v: u16,
    t: u16,
    fine_x: u8,
    write_latch: bool,
    read_buffer: u8,

    // Background pipeline latches and shifters
    next_tile_id: u8,
    next_tile_attr: u8,
    next_tile_lsb: u8,
    next_tile_msb: u8,
    bg_shift_pattern_lo: u16,
    bg_shift_pattern_hi: u16,
    bg_shift_attr_lo: u16,
    bg_shift_attr_hi: u16,

    // Sprite memory and evaluation state
    oam: Vec<u8>,
    secondary_oam: Vec<u8>,
    eval_n: u8,
    eval_m: u8,
    eval_found: u8,
    eval_copy: u8,
    eval_done: bool,
    eval_overflow_scan: bool,
    sprite_zero_next: bool,
    sprite_zero_line: bool,
    sprite_count: u8,
    sprite_pattern_lo: [u8; 8],
    sprite_pattern_hi: [u8; 8],
    sprite_attr: [u8; 8],
    sprite_x: [u8; 8],

    // Video memory
    vram: Vec<u8>,
    palette_ram: Vec<u8>,

    // Timing
    scanline: u16,
    cycle: u16,
    frame: u64,
    odd_frame: bool,

    // NMI state
    nmi_pending: bool,
    vblank_just_set: bool,
}

impl SaveState {
    /// Capture the current PPU state
    pub fn capture(ppu: &Ppu) -> Self {
        SaveState {
            version: SAVE_STATE_VERSION,
            timestamp: chrono::Local::now().to_rfc3339(),
            ppuctrl: ppu.ppuctrl,
            ppumask: ppu.ppumask,
            ppustatus: ppu.ppustatus,
            oam_addr: ppu.oam_addr,
            v: ppu.v,
            t: ppu.t,
            fine_x: ppu.fine_x,
            write_latch: ppu.write_latch,
            read_buffer: ppu.read_buffer,
            next_tile_id: ppu.next_tile_id,
            next_tile_attr: ppu.next_tile_attr,
            next_tile_lsb: ppu.next_tile_lsb,
            next_tile_msb: ppu.next_tile_msb,
            bg_shift_pattern_lo: ppu.bg_shift_pattern_lo,
            bg_shift_pattern_hi: ppu.bg_shift_pattern_hi,
            bg_shift_attr_lo: ppu.bg_shift_attr_lo,
            bg_shift_attr_hi: ppu.bg_shift_attr_hi,
            oam: ppu.oam.to_vec(),
            secondary_oam: ppu.secondary_oam.to_vec(),
            eval_n: ppu.eval_n,
            eval_m: ppu.eval_m,
            eval_found: ppu.eval_found,
            eval_copy: ppu.eval_copy,
            eval_done: ppu.eval_done,
            eval_overflow_scan: ppu.eval_overflow_scan,
            sprite_zero_next: ppu.sprite_zero_next,
            sprite_zero_line: ppu.sprite_zero_line,
            sprite_count: ppu.sprite_count,
            sprite_pattern_lo: ppu.sprite_pattern_lo,
            sprite_pattern_hi: ppu.sprite_pattern_hi,
            sprite_attr: ppu.sprite_attr,
            sprite_x: ppu.sprite_x,
            vram: ppu.vram.to_vec(),
            palette_ram: ppu.palette_ram.to_vec(),
            scanline: ppu.scanline,
            cycle: ppu.cycle,
            frame: ppu.frame,
            odd_frame: ppu.odd_frame,
            nmi_pending: ppu.nmi_pending,
            vblank_just_set: ppu.vblank_just_set,
        }
    }

    /// Restore this state into a PPU
    ///
    /// The mapper attachment and mirroring mode are not part of the state;
    /// the caller restores the same cartridge separately.
    pub fn restore(&self, ppu: &mut Ppu) -> Result<(), SaveStateError> {
        if self.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: self.version,
            });
        }

        if self.oam.len() != ppu.oam.len()
            || self.secondary_oam.len() != ppu.secondary_oam.len()
            || self.vram.len() != ppu.vram.len()
            || self.palette_ram.len() != ppu.palette_ram.len()
        {
            return Err(SaveStateError::CorruptState(
                "memory block length mismatch".to_string(),
            ));
        }

        ppu.ppuctrl = self.ppuctrl;
        ppu.ppumask = self.ppumask;
        ppu.ppustatus = self.ppustatus;
        ppu.oam_addr = self.oam_addr;
        ppu.v = self.v;
        ppu.t = self.t;
        ppu.fine_x = self.fine_x;
        ppu.write_latch = self.write_latch;
        ppu.read_buffer = self.read_buffer;
        ppu.next_tile_id = self.next_tile_id;
        ppu.next_tile_attr = self.next_tile_attr;
        ppu.next_tile_lsb = self.next_tile_lsb;
        ppu.next_tile_msb = self.next_tile_msb;
        ppu.bg_shift_pattern_lo = self.bg_shift_pattern_lo;
        ppu.bg_shift_pattern_hi = self.bg_shift_pattern_hi;
        ppu.bg_shift_attr_lo = self.bg_shift_attr_lo;
        ppu.bg_shift_attr_hi = self.bg_shift_attr_hi;
        ppu.oam.copy_from_slice(&self.oam);
        ppu.secondary_oam.copy_from_slice(&self.secondary_oam);
        ppu.eval_n = self.eval_n;
        ppu.eval_m = self.eval_m;
        ppu.eval_found = self.eval_found;
        ppu.eval_copy = self.eval_copy;
        ppu.eval_done = self.eval_done;
        ppu.eval_overflow_scan = self.eval_overflow_scan;
        ppu.sprite_zero_next = self.sprite_zero_next;
        ppu.sprite_zero_line = self.sprite_zero_line;
        ppu.sprite_count = self.sprite_count;
        ppu.sprite_pattern_lo = self.sprite_pattern_lo;
        ppu.sprite_pattern_hi = self.sprite_pattern_hi;
        ppu.sprite_attr = self.sprite_attr;
        ppu.sprite_x = self.sprite_x;
        ppu.vram.copy_from_slice(&self.vram);
        ppu.palette_ram.copy_from_slice(&self.palette_ram);
        ppu.scanline = self.scanline;
        ppu.cycle = self.cycle;
        ppu.frame = self.frame;
        ppu.odd_frame = self.odd_frame;
        ppu.nmi_pending = self.nmi_pending;
        ppu.vblank_just_set = self.vblank_just_set;

        Ok(())
    }

    /// Save this state to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SaveStateError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a state from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, SaveStateError> {
        let json = fs::read_to_string(path)?;
        let state: SaveState = serde_json::from_str(&json)?;

        if state.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: state.version,
            });
        }

        Ok(state)
    }
}
