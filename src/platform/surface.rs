//=========================================================================
// Pixels Surface
//=========================================================================
//
// `Surface` implementation backed by a `pixels` frame buffer.
//
// The buffer has the fixed logical resolution from the configuration;
// window resizes only rescale the presentation surface, so scenes always
// draw into the same pixel grid.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;
use pixels::Pixels;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::render::{Color, Surface};

//=== PixelsSurface =======================================================

pub(crate) struct PixelsSurface {
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl PixelsSurface {
    pub(crate) fn new(pixels: Pixels<'static>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Rescales the presentation surface after a window resize.
    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Err(e) = self.pixels.resize_surface(width, height) {
            warn!(target: "platform", "surface resize to {}x{} failed: {}", width, height, e);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}

impl Surface for PixelsSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let i = self.offset(x, y)?;
        let frame = self.pixels.frame();
        Some(Color::rgba(frame[i], frame[i + 1], frame[i + 2], frame[i + 3]))
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels.frame_mut()[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    fn present(&mut self) -> Result<(), SceneError> {
        self.pixels
            .render()
            .map_err(|e| SceneError::Surface(e.to_string()))
    }

    fn clear(&mut self, color: Color) {
        let rgba = color.to_array();
        for chunk in self.pixels.frame_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&rgba);
        }
    }
}
