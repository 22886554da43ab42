//=========================================================================
// Render Primitives
//
// Minimal software-rendering layer used by scenes.
//
// A `Surface` is an RGBA pixel target. Only three operations are
// required from an implementation (size, pixel access, present); shapes,
// image blitting and clearing are provided on top of those. The windowed
// build renders into a `pixels` frame buffer, tests render into the
// headless `FrameBuffer` defined here.
//
// Scenes organize what they draw into views (drawable, time-aware) and
// models (time-aware only). `Layers` keeps both ordered lists.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

//=== External Dependencies ===============================================

use image::RgbaImage;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;

//=== Color ===============================================================

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Composites `self` over `dst` (straight alpha).
    pub fn over(self, dst: Color) -> Color {
        match self.a {
            255 => self,
            0 => dst,
            alpha => {
                let a = alpha as u32;
                let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
                Color {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: dst.a.max(alpha),
                }
            }
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

//=== Surface =============================================================

/// RGBA pixel target a scene draws into.
///
/// Coordinates are in pixels with a top-left origin. Drawing outside the
/// surface is clipped silently.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Reads one pixel, `None` when out of bounds.
    fn pixel(&self, x: u32, y: u32) -> Option<Color>;

    /// Overwrites one pixel. Out-of-bounds writes are ignored.
    fn set_pixel(&mut self, x: u32, y: u32, color: Color);

    /// Pushes the finished frame to its destination.
    fn present(&mut self) -> Result<(), SceneError>;

    //--- Provided ---------------------------------------------------------

    fn clear(&mut self, color: Color) {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Alpha-blends `color` onto the pixel at signed coordinates.
    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if let Some(dst) = self.pixel(x, y) {
            self.set_pixel(x, y, color.over(dst));
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                self.blend_pixel(x + dx, y + dy, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color) {
        let r = radius as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.blend_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Bresenham line between two points, both ends inclusive.
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend_pixel(x, y, color);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draws `image` with its top-left corner at (`x`, `y`).
    fn blit(&mut self, image: &RgbaImage, x: i32, y: i32) {
        for (ix, iy, pixel) in image.enumerate_pixels() {
            self.blend_pixel(x + ix as i32, y + iy as i32, Color::from(pixel.0));
        }
    }
}

//=== FrameBuffer =========================================================

/// Headless in-memory surface.
///
/// Counts presented frames, which makes it convenient for driving scene
/// trees without a window.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    presented: usize,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            presented: 0,
        }
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}

impl Surface for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let i = self.offset(x, y)?;
        Some(Color::rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    fn present(&mut self) -> Result<(), SceneError> {
        self.presented += 1;
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color.to_array());
        }
    }
}

//=== Views & Models ======================================================

/// Something a scene draws every frame.
pub trait View {
    /// Advances any time-based state (animation frames, scrolling).
    fn update(&mut self, _delta: Duration) {}

    fn draw(&self, surface: &mut dyn Surface);
}

/// Time-driven state with no visual representation of its own.
pub trait Model {
    fn update(&mut self, delta: Duration);
}

/// A view or model that its scene also keeps a handle to.
///
/// [`Layers`] drives the shared value each frame while the scene keeps
/// reading and steering it between frames.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

impl<V: View> View for Rc<RefCell<V>> {
    fn update(&mut self, delta: Duration) {
        self.borrow_mut().update(delta);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.borrow().draw(surface);
    }
}

impl<M: Model> Model for Rc<RefCell<M>> {
    fn update(&mut self, delta: Duration) {
        self.borrow_mut().update(delta);
    }
}

/// A static image drawn at a fixed position.
#[derive(Debug, Clone)]
pub struct ImageView {
    image: RgbaImage,
    position: (i32, i32),
}

impl ImageView {
    pub fn new(image: RgbaImage, position: (i32, i32)) -> Self {
        Self { image, position }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl View for ImageView {
    fn draw(&self, surface: &mut dyn Surface) {
        surface.blit(&self.image, self.position.0, self.position.1);
    }
}

/// Ordered view and model lists owned by a scene.
///
/// Views draw in insertion order, so the first view pushed is the
/// bottom-most layer.
#[derive(Default)]
pub struct Layers {
    views: Vec<Box<dyn View>>,
    models: Vec<Box<dyn Model>>,
}

impl Layers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_view(&mut self, view: impl View + 'static) {
        self.views.push(Box::new(view));
    }

    pub fn push_model(&mut self, model: impl Model + 'static) {
        self.models.push(Box::new(model));
    }

    pub fn update_models(&mut self, delta: Duration) {
        for model in &mut self.models {
            model.update(delta);
        }
    }

    pub fn update_views(&mut self, delta: Duration) {
        for view in &mut self.views {
            view.update(delta);
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        for view in &self.views {
            view.draw(surface);
        }
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
