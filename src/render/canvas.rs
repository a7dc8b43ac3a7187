use crate::error::{LoadError, RenderError};
use macroquad::prelude::*;
use std::path::Path;

/// The drawing surface the map, entity and backgrounds render through.
///
/// `set_target(None)` selects the screen; `Some(image)` redirects draws into
/// an offscreen image created by `create_image`.
pub trait Canvas {
    type Image;

    fn load_image(&mut self, path: &Path) -> Result<Self::Image, LoadError>;

    /// Allocates an offscreen image that can be used as a render target.
    fn create_image(&mut self, width: u32, height: u32) -> Result<Self::Image, RenderError>;

    fn image_size(&self, image: &Self::Image) -> (u32, u32);

    fn set_target(&mut self, target: Option<&Self::Image>) -> Result<(), RenderError>;

    /// Fills the whole current target.
    fn fill(&mut self, color: Color) -> Result<(), RenderError>;

    /// Copies `src` of `image` (whole image if `None`) to `dest` on the
    /// current target.
    fn blit(
        &mut self,
        image: &Self::Image,
        src: Option<Rect>,
        dest: Rect,
        flip_x: bool,
    ) -> Result<(), RenderError>;
}
