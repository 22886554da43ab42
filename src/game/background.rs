//=========================================================================
// Background
//
// Picks the backdrop image drawn beneath everything else: a named or
// random picture from the backgrounds batch, optionally stretched to the
// window, or a generated starfield when no picture is available.
//
//=========================================================================

//=== External Dependencies ===============================================

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;
use rand::Rng;

//=== Internal Dependencies ===============================================

use crate::core::assets::AssetBatch;

//=== Constants ===========================================================

/// Roughly one star per this many pixels.
const STAR_DENSITY: u32 = 600;
const SPACE: Rgba<u8> = Rgba([4, 4, 16, 255]);

//=== Fit =================================================================

/// How a picture is adapted to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Original size, anchored top-left.
    Keep,
    /// Scaled to exactly the window resolution.
    Stretch,
}

//=== Loading =============================================================

/// Returns picture `name` from `batch`, or a random one when `name` is
/// absent or unknown. `None` only when the batch is empty.
pub fn pick<R: Rng + ?Sized>(
    batch: &AssetBatch,
    name: Option<&str>,
    fit: Fit,
    resolution: (u32, u32),
    rng: &mut R,
) -> Option<RgbaImage> {
    let image = match name.and_then(|n| batch.get(n)) {
        Some(image) => image,
        None => batch.choose(rng)?,
    };

    Some(match fit {
        Fit::Keep => image.clone(),
        Fit::Stretch => {
            let (w, h) = resolution;
            debug!(target: "game", "stretching background to {}x{}", w, h);
            imageops::resize(image, w.max(1), h.max(1), FilterType::Triangle)
        }
    })
}

/// Random white and bluish stars on a near-black field.
pub fn starfield<R: Rng + ?Sized>(resolution: (u32, u32), rng: &mut R) -> RgbaImage {
    let (w, h) = (resolution.0.max(1), resolution.1.max(1));
    let mut image = RgbaImage::from_pixel(w, h, SPACE);

    let stars = (w * h / STAR_DENSITY).max(1);
    for _ in 0..stars {
        let (x, y) = (rng.gen_range(0..w), rng.gen_range(0..h));
        let level: u8 = rng.gen_range(120..=255);
        let blue = level.saturating_add(rng.gen_range(0..40));
        image.put_pixel(x, y, Rgba([level, level, blue, 255]));
    }
    image
}

//=========================================================================
// Unit Tests
//=========================================================================
