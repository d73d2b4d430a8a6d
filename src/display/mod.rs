// Display module - frame output consumed by the host presentation layer

pub mod framebuffer;
pub mod palette;

pub use framebuffer::{FrameBuffer, SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH};
pub use palette::{palette_to_rgb, palette_to_rgba, NES_PALETTE};
