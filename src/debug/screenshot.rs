// Screenshot functionality
//
// Saves a rendered frame buffer as a PNG file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::display::{FrameBuffer, NES_PALETTE, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Write a frame buffer to a PNG file at the given path
///
/// The palette-index frame is resolved through the master palette and
/// encoded as 256x240 RGB.
pub fn write_frame_png(path: &Path, frame: &FrameBuffer) -> Result<(), ScreenshotError> {
    let rgb_data = frame_to_rgb(frame);

    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&rgb_data)?;

    Ok(())
}

/// Save a timestamped screenshot into a directory
///
/// Creates the directory if needed and names the file
/// `screenshot_<timestamp>.png`.
///
/// # Returns
///
/// The path of the written file
pub fn save_screenshot(dir: &Path, frame: &FrameBuffer) -> Result<PathBuf, ScreenshotError> {
    fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let file_path = dir.join(format!("screenshot_{}.png", timestamp));

    write_frame_png(&file_path, frame)?;
    Ok(file_path)
}

/// Resolve a palette-index frame to RGB888 bytes
fn frame_to_rgb(frame: &FrameBuffer) -> Vec<u8> {
    let mut rgb_data = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);

    for &index in frame.as_slice() {
        let color = NES_PALETTE[(index & 0x3F) as usize];
        rgb_data.push(((color >> 16) & 0xFF) as u8); // R
        rgb_data.push(((color >> 8) & 0xFF) as u8); // G
        rgb_data.push((color & 0xFF) as u8); // B
    }

    rgb_data
}
