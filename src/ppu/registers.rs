// PPU register interface - the eight CPU-facing ports

use super::constants::PPU_REGISTER_MASK;
use super::{Ppu, CTRL_INCREMENT_32, CTRL_NMI_ENABLE, STATUS_VBLANK};
use crate::bus::MemoryMappedDevice;

impl Ppu {
    /// Read from a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register index (0-7)
    ///
    /// # Panics
    ///
    /// Panics if `register` is out of range; that is a driver bug, not an
    /// emulated condition.
    ///
    /// # Register Behaviors
    ///
    /// - PPUSTATUS (2): Returns flag bits over stale read-buffer bits,
    ///   clears the VBlank flag and resets the write toggle
    /// - OAMDATA (4): Returns OAM data at the current OAM address, no
    ///   address increment
    /// - PPUDATA (7): Returns buffered PPU data (palette reads are
    ///   immediate) and advances the VRAM address
    /// - Write-only registers: Return 0
    pub fn register_read(&mut self, register: u8) -> u8 {
        assert!(register < 8, "PPU register index {} out of range", register);

        match register {
            2 => {
                // PPUSTATUS - Read only
                // The low 5 bits are never driven by the status register;
                // reads see the stale low bits of the internal read buffer.
                let status = (self.ppustatus & 0xE0) | (self.read_buffer & 0x1F);

                // Clear VBlank flag (bit 7)
                self.ppustatus &= !STATUS_VBLANK;

                // Reset address latch (w register)
                self.write_latch = false;

                // Race condition: a read on the exact dot the VBlank flag is
                // set suppresses the NMI for this frame.
                if self.vblank_just_set {
                    self.nmi_pending = false;
                }

                status
            }
            4 => {
                // OAMDATA - reads do not advance the OAM address
                self.oam[self.oam_addr as usize]
            }
            7 => {
                // PPUDATA - buffered for $0000-$3EFF; palette reads bypass
                // the buffer but still refill it from the nametable
                // underneath the palette address.
                let addr = self.v & 0x3FFF;
                let value;

                if addr >= 0x3F00 {
                    value = self.read_ppu_memory(addr);
                    self.read_buffer = self.read_ppu_memory(addr & 0x2FFF);
                } else {
                    value = self.read_buffer;
                    self.read_buffer = self.read_ppu_memory(addr);
                }

                self.increment_vram_addr();
                value
            }
            // PPUCTRL, PPUMASK, OAMADDR, PPUSCROLL, PPUADDR are write only
            _ => 0,
        }
    }

    /// Write to a PPU register
    ///
    /// # Arguments
    ///
    /// * `register` - The register index (0-7)
    /// * `data` - The value to write
    ///
    /// # Panics
    ///
    /// Panics if `register` is out of range.
    ///
    /// # Register Behaviors
    ///
    /// - PPUCTRL (0): Stores control flags and updates nametable select in t
    /// - PPUMASK (1): Stores mask flags
    /// - OAMADDR (3): Sets OAM address
    /// - OAMDATA (4): Writes to OAM and increments the address
    /// - PPUSCROLL (5): Two-write scroll latch (updates t and fine x)
    /// - PPUADDR (6): Two-write address latch (updates t, then copies to v)
    /// - PPUDATA (7): Writes to PPU memory and advances v
    /// - PPUSTATUS (2) is read-only; writes are ignored
    pub fn register_write(&mut self, register: u8, data: u8) {
        assert!(register < 8, "PPU register index {} out of range", register);

        match register {
            0 => {
                // PPUCTRL
                let old_nmi_enable = self.ppuctrl & CTRL_NMI_ENABLE != 0;
                let new_nmi_enable = data & CTRL_NMI_ENABLE != 0;

                self.ppuctrl = data;

                // Nametable select bits of t
                // t: ...GH.. ........ <- d: ......GH
                self.t = (self.t & 0xF3FF) | (((data as u16) & 0x03) << 10);

                if !old_nmi_enable && new_nmi_enable {
                    // Enabling NMI with the VBlank flag already set raises
                    // the edge immediately (unless we are on the exact dot
                    // the flag was set - that path fires on its own).
                    if self.ppustatus & STATUS_VBLANK != 0 && !self.vblank_just_set {
                        self.nmi_pending = true;
                    }
                } else if old_nmi_enable && !new_nmi_enable {
                    // Disabling NMI cancels a pending edge
                    self.nmi_pending = false;
                }
            }
            1 => {
                // PPUMASK
                self.ppumask = data;
            }
            2 => {
                // PPUSTATUS is read-only
            }
            3 => {
                // OAMADDR
                self.oam_addr = data;
            }
            4 => {
                // OAMDATA - write and advance
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                // PPUSCROLL - two writes through the shared toggle
                if !self.write_latch {
                    // First write: X scroll
                    // t: ....... ...ABCDE <- d: ABCDEFGH
                    // x:              FGH <- d: ABCDEFGH
                    self.t = (self.t & 0xFFE0) | ((data as u16) >> 3);
                    self.fine_x = data & 0x07;
                    self.write_latch = true;
                } else {
                    // Second write: Y scroll
                    // t: FGH..AB CDE..... <- d: ABCDEFGH
                    self.t = (self.t & 0x8FFF) | (((data as u16) & 0x07) << 12);
                    self.t = (self.t & 0xFC1F) | (((data as u16) & 0xF8) << 2);
                    self.write_latch = false;
                }
            }
            6 => {
                // PPUADDR - high byte then low byte
                if !self.write_latch {
                    // t: .CDEFGH ........ <- d: ..CDEFGH
                    // t: X...... ........ <- 0
                    self.t = (self.t & 0x80FF) | (((data as u16) & 0x3F) << 8);
                    self.write_latch = true;
                } else {
                    // t: ....... ABCDEFGH <- d: ABCDEFGH
                    // v: <...all bits...> <- t
                    self.t = (self.t & 0xFF00) | (data as u16);
                    self.v = self.t;
                    self.write_latch = false;
                }
            }
            7 => {
                // PPUDATA
                self.write_ppu_memory(self.v, data);
                self.increment_vram_addr();
            }
            _ => unreachable!(),
        }
    }

    /// Advance v by 1 or 32 per the PPUCTRL increment-mode bit
    fn increment_vram_addr(&mut self) {
        let increment = if self.ppuctrl & CTRL_INCREMENT_32 != 0 {
            32
        } else {
            1
        };
        self.v = self.v.wrapping_add(increment) & 0x3FFF;
    }

    /// Bulk OAM write path (the $4014 DMA transfer)
    ///
    /// Equivalent to 256 sequential OAMDATA writes starting at the current
    /// OAM address. The CPU-side cycle stealing is the driver's concern.
    pub fn write_oam_dma(&mut self, data: &[u8; 256]) {
        for &byte in data.iter() {
            self.oam[self.oam_addr as usize] = byte;
            self.oam_addr = self.oam_addr.wrapping_add(1);
        }
    }
}

impl MemoryMappedDevice for Ppu {
    /// Read from the PPU's CPU-visible range
    ///
    /// The eight registers repeat every 8 bytes across $2000-$3FFF.
    fn read(&mut self, addr: u16) -> u8 {
        assert!(
            (0x2000..=0x3FFF).contains(&addr),
            "address {:#06X} is not mapped to the PPU",
            addr
        );
        self.register_read((addr & PPU_REGISTER_MASK) as u8)
    }

    /// Write to the PPU's CPU-visible range
    fn write(&mut self, addr: u16, data: u8) {
        assert!(
            (0x2000..=0x3FFF).contains(&addr),
            "address {:#06X} is not mapped to the PPU",
            addr
        );
        self.register_write((addr & PPU_REGISTER_MASK) as u8, data);
    }
}
