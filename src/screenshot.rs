/*!
PNG export of the current frame (feature `screenshot`).
*/

use std::path::Path;

use image::{ImageResult, Rgba, RgbaImage};

use crate::console::Console;
use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Current frame as an RGBA image through the master palette.
pub fn frame_image(console: &Console) -> RgbaImage {
    RgbaImage::from_fn(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, |x, y| {
        Rgba(console.screen_pixel(x as usize, y as usize).to_array())
    })
}

/// Save the current frame as a PNG (format chosen from the extension).
pub fn save_png<P: AsRef<Path>>(console: &Console, path: P) -> ImageResult<()> {
    frame_image(console).save(path)
}
