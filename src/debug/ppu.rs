// PPU Debugger - state snapshots and pattern table rendering
//
// Provides:
// - PPU state capture for inspection
// - Pattern table tile-sheet rendering
// - PNG export of rendered sheets

use std::fs;
use std::io;
use std::path::Path;

use crate::display::palette_to_rgba;
use crate::ppu::Ppu;

/// Width/height of a rendered pattern table sheet in pixels
///
/// Each pattern table holds 256 tiles in a 16x16 arrangement of 8x8 tiles.
pub const PATTERN_TABLE_DIM: usize = 128;

/// PPU state snapshot
///
/// A point-in-time copy of the externally interesting PPU state.
#[derive(Debug, Clone)]
pub struct PpuState {
    /// Current scanline (0-261)
    pub scanline: u16,

    /// Current cycle (0-340)
    pub cycle: u16,

    /// Frame counter
    pub frame: u64,

    /// PPUCTRL register
    pub ppuctrl: u8,

    /// PPUMASK register
    pub ppumask: u8,

    /// PPUSTATUS register
    pub ppustatus: u8,

    /// OAMADDR register
    pub oam_addr: u8,

    /// Current VRAM address (v)
    pub v: u16,

    /// Temporary VRAM address (t)
    pub t: u16,

    /// Fine X scroll
    pub fine_x: u8,

    /// Write latch (w)
    pub write_latch: bool,

    /// NMI pending flag
    pub nmi_pending: bool,
}

impl PpuState {
    /// Capture the current PPU state
    pub fn capture(ppu: &Ppu) -> Self {
        PpuState {
            scanline: ppu.scanline(),
            cycle: ppu.cycle(),
            frame: ppu.frame_count(),
            ppuctrl: ppu.ppuctrl,
            ppumask: ppu.ppumask,
            ppustatus: ppu.ppustatus,
            oam_addr: ppu.oam_addr,
            v: ppu.v,
            t: ppu.t,
            fine_x: ppu.fine_x,
            write_latch: ppu.write_latch,
            nmi_pending: ppu.nmi_pending(),
        }
    }

    /// Format PPUCTRL flags for display
    pub fn format_ppuctrl(&self) -> String {
        let mut flags = Vec::new();

        if self.ppuctrl & 0x80 != 0 {
            flags.push("NMI");
        }
        if self.ppuctrl & 0x20 != 0 {
            flags.push("SPR8x16");
        } else {
            flags.push("SPR8x8");
        }
        if self.ppuctrl & 0x10 != 0 {
            flags.push("BG@$1000");
        } else {
            flags.push("BG@$0000");
        }
        if self.ppuctrl & 0x08 != 0 {
            flags.push("SPR@$1000");
        } else {
            flags.push("SPR@$0000");
        }
        if self.ppuctrl & 0x04 != 0 {
            flags.push("+32");
        } else {
            flags.push("+1");
        }

        flags.push(match self.ppuctrl & 0x03 {
            0 => "NT$2000",
            1 => "NT$2400",
            2 => "NT$2800",
            _ => "NT$2C00",
        });

        flags.join(" ")
    }
}

impl Ppu {
    /// Render a pattern table to a 128x128 RGBA tile sheet
    ///
    /// Decodes all 256 tiles of the selected CHR bank through one of the
    /// eight frame palettes. Read-only: no emulation state is touched.
    ///
    /// # Arguments
    ///
    /// * `table` - Pattern table index (0 = $0000, 1 = $1000)
    /// * `palette` - Frame palette (0-3 background, 4-7 sprite)
    ///
    /// # Returns
    ///
    /// RGBA pixel data, 128x128x4 bytes, tiles laid out 16x16
    ///
    /// # Panics
    ///
    /// Panics if `table` > 1 or `palette` > 7 (caller contract).
    pub fn get_pattern_table(&self, table: u8, palette: u8) -> Vec<u8> {
        assert!(table < 2, "pattern table index {} out of range", table);
        assert!(palette < 8, "palette index {} out of range", palette);

        let base = (table as u16) * 0x1000;
        let mut sheet = vec![0u8; PATTERN_TABLE_DIM * PATTERN_TABLE_DIM * 4];

        for tile_y in 0..16u16 {
            for tile_x in 0..16u16 {
                let offset = base + tile_y * 0x0100 + tile_x * 0x0010;
                for row in 0..8u16 {
                    let lsb = self.read_ppu_memory(offset + row);
                    let msb = self.read_ppu_memory(offset + row + 8);
                    for col in 0..8u16 {
                        let bit = 7 - col;
                        let pixel = ((lsb >> bit) & 0x01) | (((msb >> bit) & 0x01) << 1);

                        let color =
                            self.palette_color((palette << 2) | pixel);
                        let rgba = palette_to_rgba(color);

                        let px = (tile_x * 8 + col) as usize;
                        let py = (tile_y * 8 + row) as usize;
                        let index = (py * PATTERN_TABLE_DIM + px) * 4;
                        sheet[index..index + 4].copy_from_slice(&rgba);
                    }
                }
            }
        }

        sheet
    }
}

/// Errors that can occur while exporting a pattern table sheet
#[derive(Debug)]
pub enum PatternTableError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for PatternTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternTableError::Io(e) => write!(f, "I/O error: {}", e),
            PatternTableError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for PatternTableError {}

impl From<io::Error> for PatternTableError {
    fn from(e: io::Error) -> Self {
        PatternTableError::Io(e)
    }
}

impl From<png::EncodingError> for PatternTableError {
    fn from(e: png::EncodingError) -> Self {
        PatternTableError::PngEncoding(e)
    }
}

/// Export a rendered pattern table sheet as a PNG file
///
/// # Arguments
///
/// * `path` - Destination file path
/// * `ppu` - The PPU whose CHR memory and palettes to render
/// * `table` - Pattern table index (0 or 1)
/// * `palette` - Frame palette (0-7)
pub fn write_pattern_table_png(
    path: &Path,
    ppu: &Ppu,
    table: u8,
    palette: u8,
) -> Result<(), PatternTableError> {
    let sheet = ppu.get_pattern_table(table, palette);

    let file = fs::File::create(path)?;
    let writer = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(
        writer,
        PATTERN_TABLE_DIM as u32,
        PATTERN_TABLE_DIM as u32,
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&sheet)?;

    Ok(())
}
