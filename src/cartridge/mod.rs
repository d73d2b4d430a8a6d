// Cartridge adapter boundary
//
// The PPU only sees two things from the cartridge: byte-addressable CHR
// (pattern) memory and the nametable mirroring mode soldered onto the board.
// Bank-switching logic lives behind the `Mapper` trait and is out of scope
// for this crate; `ChrRom` is the NROM-style flat implementation used by the
// unit tests and benchmarks.

/// Nametable mirroring mode reported by the cartridge
///
/// The PPU has 2KB of internal VRAM but addresses 4 logical nametables.
/// The cartridge decides how the logical tables fold onto physical memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000=$2400, $2800=$2C00 (vertical scrolling layouts)
    Horizontal,
    /// $2000=$2800, $2400=$2C00 (horizontal scrolling layouts)
    Vertical,
    /// All four tables map to the first physical table
    SingleScreenA,
    /// All four tables map to the second physical table
    SingleScreenB,
    /// Four distinct tables (cartridge supplies the extra VRAM)
    FourScreen,
}

/// Cartridge-side interface consumed by the PPU
///
/// Covers the CHR (pattern) address space $0000-$1FFF. The write path exists
/// for boards with CHR-RAM; CHR-ROM implementations ignore writes.
pub trait Mapper {
    /// Read a byte from CHR space ($0000-$1FFF)
    fn ppu_read(&self, addr: u16) -> u8;

    /// Write a byte to CHR space (ignored for CHR-ROM)
    fn ppu_write(&mut self, addr: u16, value: u8);

    /// Nametable mirroring mode for this cartridge
    fn mirroring(&self) -> Mirroring;
}

/// Error type for cartridge construction
#[derive(Debug)]
pub enum CartridgeError {
    /// CHR data is not exactly 8KB
    InvalidChrSize(usize),
}

impl std::fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartridgeError::InvalidChrSize(size) => {
                write!(f, "CHR memory must be 8KB, got {} bytes", size)
            }
        }
    }
}

impl std::error::Error for CartridgeError {}

/// CHR memory size for a flat (unbanked) cartridge
const CHR_SIZE: usize = 8 * 1024;

/// Flat 8KB CHR-ROM/CHR-RAM cartridge with fixed mirroring
///
/// Equivalent to an NROM board as far as the PPU is concerned: no banking,
/// the whole pattern space maps 1:1 onto the backing store.
pub struct ChrRom {
    chr: Vec<u8>,
    writable: bool,
    mirroring: Mirroring,
}

impl ChrRom {
    /// Create a read-only CHR-ROM cartridge
    ///
    /// # Errors
    /// Returns `CartridgeError::InvalidChrSize` if `chr` is not exactly 8KB.
    pub fn new_rom(chr: Vec<u8>, mirroring: Mirroring) -> Result<Self, CartridgeError> {
        if chr.len() != CHR_SIZE {
            return Err(CartridgeError::InvalidChrSize(chr.len()));
        }
        Ok(ChrRom {
            chr,
            writable: false,
            mirroring,
        })
    }

    /// Create a writable CHR-RAM cartridge, zero-filled
    pub fn new_ram(mirroring: Mirroring) -> Self {
        ChrRom {
            chr: vec![0; CHR_SIZE],
            writable: true,
            mirroring,
        }
    }
}

impl Mapper for ChrRom {
    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr[(addr as usize) & (CHR_SIZE - 1)]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.writable {
            self.chr[(addr as usize) & (CHR_SIZE - 1)] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
