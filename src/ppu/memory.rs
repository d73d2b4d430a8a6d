// PPU memory access - VRAM, palette, and the CHR window into the cartridge

use super::constants::NAMETABLE_SIZE;
use super::Ppu;
use crate::cartridge::Mirroring;

impl Ppu {
    /// Mirror a nametable address onto physical VRAM
    ///
    /// The address space allows 4 nametables ($2000-$2FFF) but the console
    /// only carries 2KB; the cartridge-reported mirroring mode decides how
    /// logical tables fold onto physical memory. Four-screen boards address
    /// all 4KB of the backing array.
    ///
    /// # Arguments
    ///
    /// * `addr` - Nametable address ($2000-$2FFF)
    ///
    /// # Returns
    ///
    /// Physical VRAM index
    pub(crate) fn mirror_nametable_addr(&self, addr: u16) -> usize {
        // Normalize address to 0-0xFFF range (remove $2000 base)
        let addr = (addr & 0x0FFF) as usize;

        let table = addr / NAMETABLE_SIZE;
        let offset = addr % NAMETABLE_SIZE;

        let mirrored_table = match self.mirroring {
            Mirroring::Horizontal => {
                // 0->0, 1->0, 2->1, 3->1 ($2000=$2400, $2800=$2C00)
                table >> 1
            }
            Mirroring::Vertical => {
                // 0->0, 1->1, 2->0, 3->1 ($2000=$2800, $2400=$2C00)
                table & 0x01
            }
            Mirroring::SingleScreenA => 0,
            Mirroring::SingleScreenB => 1,
            Mirroring::FourScreen => table,
        };

        mirrored_table * NAMETABLE_SIZE + offset
    }

    /// Mirror a palette address onto the 32-byte palette RAM
    ///
    /// $3F10, $3F14, $3F18, $3F1C alias $3F00, $3F04, $3F08, $3F0C: sprite
    /// palette entry 0 is really the shared background color.
    pub(crate) fn mirror_palette_addr(&self, addr: u16) -> usize {
        // Palette RAM is at $3F00-$3F1F, mirrored every 32 bytes
        let addr = (addr & 0x001F) as usize;

        if addr >= 16 && addr % 4 == 0 {
            addr - 16
        } else {
            addr
        }
    }

    /// Read from PPU memory (pattern tables, nametables, palette)
    ///
    /// This is the internal read path used by PPUDATA and by the rendering
    /// pipeline's fetches.
    ///
    /// # Arguments
    ///
    /// * `addr` - PPU memory address ($0000-$3FFF)
    pub(crate) fn read_ppu_memory(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF; // Mirror to 14-bit address space

        match addr {
            // Pattern tables: $0000-$1FFF, served by the cartridge
            0x0000..=0x1FFF => {
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow().ppu_read(addr)
                } else {
                    0
                }
            }

            // Nametables: $2000-$2FFF
            0x2000..=0x2FFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr);
                self.vram[mirrored_addr]
            }

            // Nametable mirrors: $3000-$3EFF -> $2000-$2EFF
            0x3000..=0x3EFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr - 0x1000);
                self.vram[mirrored_addr]
            }

            // Palette RAM: $3F00-$3FFF
            0x3F00..=0x3FFF => {
                let mirrored_addr = self.mirror_palette_addr(addr);
                self.palette_ram[mirrored_addr]
            }

            _ => unreachable!(),
        }
    }

    /// Write to PPU memory (pattern tables, nametables, palette)
    ///
    /// Pattern-table writes reach the cartridge; boards without CHR-RAM
    /// ignore them.
    pub(crate) fn write_ppu_memory(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x3FFF; // Mirror to 14-bit address space

        match addr {
            0x0000..=0x1FFF => {
                if let Some(ref mapper) = self.mapper {
                    mapper.borrow_mut().ppu_write(addr, data);
                }
            }

            0x2000..=0x2FFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr);
                self.vram[mirrored_addr] = data;
            }

            0x3000..=0x3EFF => {
                let mirrored_addr = self.mirror_nametable_addr(addr - 0x1000);
                self.vram[mirrored_addr] = data;
            }

            0x3F00..=0x3FFF => {
                let mirrored_addr = self.mirror_palette_addr(addr);
                self.palette_ram[mirrored_addr] = data;
            }

            _ => unreachable!(),
        }
    }

    /// Resolve a 5-bit frame palette index to a master palette color (0-63)
    ///
    /// Index 0 and the sprite-palette aliases fall through to the universal
    /// background color.
    pub(crate) fn palette_color(&self, index: u8) -> u8 {
        let mut idx = (index & 0x1F) as usize;
        if idx >= 16 && idx % 4 == 0 {
            idx -= 16;
        }
        self.palette_ram[idx] & 0x3F
    }
}
