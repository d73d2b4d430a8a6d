// Debug module - read-only tooling surface over the PPU
//
// Nothing in here mutates emulation state.

mod ppu;
mod screenshot;

pub use ppu::{write_pattern_table_png, PatternTableError, PpuState, PATTERN_TABLE_DIM};
pub use screenshot::{save_screenshot, write_frame_png, ScreenshotError};
