/// RGBA rasterizer and PNG encoder

use crate::rendering::layout::{CHAR_W, LINE_H};
use crate::rendering::paint::PaintCommand;
use crate::rendering::Screenshot;
use crate::{Error, Result};

/// Largest edge we are willing to allocate a canvas for
pub const MAX_EDGE: u32 = 8192;

pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
            return Err(Error::RenderError(format!("canvas size {}x{} out of bounds", width, height)));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Fill a rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: (u8, u8, u8, u8)) {
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = ((x as i64 + width as i64).max(0) as u32).min(self.width);
        let y1 = ((y as i64 + height as i64).max(0) as u32).min(self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                let i = ((py * self.width + px) * 4) as usize;
                self.pixels[i] = rgba.0;
                self.pixels[i + 1] = rgba.1;
                self.pixels[i + 2] = rgba.2;
                self.pixels[i + 3] = rgba.3;
            }
        }
    }

    /// Draw text as 5x7 block glyphs in 8x10 cells. Glyph bits are derived
    /// from the character code, so distinct characters look distinct and
    /// output is deterministic.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, rgba: (u8, u8, u8, u8)) {
        let scale = scale.max(1);
        for (row, line) in text.lines().enumerate() {
            let top = y + (row as u32 * LINE_H * scale) as i32;
            for (col, ch) in line.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let left = x + (col as u32 * CHAR_W * scale) as i32;
                let bits = glyph_bits(ch);
                for gy in 0..7u32 {
                    for gx in 0..5u32 {
                        if bits & (1 << (gy * 5 + gx)) != 0 {
                            self.fill_rect(
                                left + (gx * scale) as i32,
                                top + (gy * scale) as i32,
                                scale,
                                scale,
                                rgba,
                            );
                        }
                    }
                }
            }
        }
    }
}

fn glyph_bits(ch: char) -> u64 {
    let mut h = (ch as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= h >> 29;
    // Keep the outline column solid so every glyph reads as ink.
    let left_column = (0..7).fold(0u64, |acc, row| acc | (1 << (row * 5)));
    (h & ((1 << 35) - 1)) | left_column
}

pub fn execute(commands: &[PaintCommand], canvas: &mut Canvas) {
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                canvas.fill_rect(*x, *y, *width, *height, *rgba)
            }
            PaintCommand::Text { x, y, text, scale, rgba } => {
                canvas.draw_text(*x, *y, text, *scale, *rgba)
            }
        }
    }
}

pub fn encode_png(canvas: &Canvas) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, canvas.width, canvas.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::RenderError(format!("png header: {}", e)))?;
        writer
            .write_image_data(&canvas.pixels)
            .map_err(|e| Error::RenderError(format!("png data: {}", e)))?;
    }
    Ok(out)
}

/// Paint `commands` onto a `width` x `height` canvas and encode it.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand]) -> Result<Screenshot> {
    let mut canvas = Canvas::new(width, height)?;
    execute(commands, &mut canvas);
    Ok(Screenshot {
        width,
        height,
        png_data: encode_png(&canvas)?,
    })
}
