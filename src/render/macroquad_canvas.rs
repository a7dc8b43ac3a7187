use crate::error::{LoadError, RenderError};
use crate::render::Canvas;
use macroquad::prelude::*;
use std::path::Path;

/// Larger surfaces are refused up front instead of failing inside the driver.
pub const MAX_SURFACE_SIZE: u32 = 8192;

pub struct MqImage {
    texture: Texture2D,
    target: Option<RenderTarget>,
}

/// `Canvas` backed by the macroquad window. Screen coordinates are logical
/// pixels, i.e. window pixels divided by the zoom level.
pub struct MacroquadCanvas {
    zoom: f32,
}

impl MacroquadCanvas {
    pub fn new(zoom: f32) -> Self {
        Self { zoom }
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }
}

impl Canvas for MacroquadCanvas {
    type Image = MqImage;

    fn load_image(&mut self, path: &Path) -> Result<MqImage, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = Image::from_file_with_format(&bytes, None).map_err(|e| LoadError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let texture = Texture2D::from_image(&image);
        texture.set_filter(FilterMode::Nearest);
        Ok(MqImage {
            texture,
            target: None,
        })
    }

    fn create_image(&mut self, width: u32, height: u32) -> Result<MqImage, RenderError> {
        if width == 0 || height == 0 || width > MAX_SURFACE_SIZE || height > MAX_SURFACE_SIZE {
            return Err(RenderError::TargetAllocation { width, height });
        }
        let target = render_target(width, height);
        target.texture.set_filter(FilterMode::Nearest);
        Ok(MqImage {
            texture: target.texture.clone(),
            target: Some(target),
        })
    }

    fn image_size(&self, image: &MqImage) -> (u32, u32) {
        let size = image.texture.size();
        (size.x as u32, size.y as u32)
    }

    fn set_target(&mut self, target: Option<&MqImage>) -> Result<(), RenderError> {
        match target {
            None => {
                let view = Rect::new(
                    0.0,
                    0.0,
                    screen_width() / self.zoom,
                    screen_height() / self.zoom,
                );
                set_camera(&Camera2D::from_display_rect(view));
            }
            Some(image) => {
                let rt = image.target.as_ref().ok_or_else(|| {
                    RenderError::Backend("image is not a render target".to_owned())
                })?;
                let size = image.texture.size();
                let mut camera = Camera2D::from_display_rect(Rect::new(0.0, 0.0, size.x, size.y));
                // render targets are sampled with the y axis inverted
                camera.zoom.y = -camera.zoom.y;
                camera.render_target = Some(rt.clone());
                set_camera(&camera);
            }
        }
        Ok(())
    }

    fn fill(&mut self, color: Color) -> Result<(), RenderError> {
        clear_background(color);
        Ok(())
    }

    fn blit(
        &mut self,
        image: &MqImage,
        src: Option<Rect>,
        dest: Rect,
        flip_x: bool,
    ) -> Result<(), RenderError> {
        draw_texture_ex(
            &image.texture,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                source: src,
                dest_size: Some(vec2(dest.w, dest.h)),
                flip_x,
                ..Default::default()
            },
        );
        Ok(())
    }
}
