// NES PPU emulation core
//
// Cycle-accurate emulation of the 2C02 Picture Processing Unit: the dot
// clock state machine, background and sprite pipelines, VRAM/palette
// addressing, and the eight-register CPU-facing interface with its
// hardware quirks. The CPU, APU and host presentation layer live elsewhere;
// the cartridge appears only as the `Mapper` capability.

// Public modules
pub mod bus;
pub mod cartridge;
pub mod debug;
pub mod display;
pub mod ppu;
pub mod state;

// Re-export main types for convenience
pub use bus::MemoryMappedDevice;
pub use cartridge::{CartridgeError, ChrRom, Mapper, Mirroring};
pub use debug::{
    save_screenshot, write_frame_png, write_pattern_table_png, PatternTableError, PpuState,
    ScreenshotError,
};
pub use display::{FrameBuffer, NES_PALETTE, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use ppu::Ppu;
pub use state::{SaveState, SaveStateError};
