//! Parallax scrolling backgrounds.

use crate::error::{Error, RenderError};
use crate::render::Canvas;
use macroquad::prelude::*;

/// Number of parallax layers, back to front.
pub const BACKGROUND_LAYERS: usize = 5;

/// One horizontally repeating background layer.
///
/// The source image is repeated until it covers the viewport width; two
/// copies of that strip are drawn side by side so the layer can scroll
/// forever.
pub struct Background<I> {
    strip: I,
    width: f64,
    height: f64,
    pub world_x: f64,
    pub velocity: f64,
    /// Scroll towards +x; set while the player faces left
    pub scroll_right: bool,
}

impl<I> Background<I> {
    /// Repeats `image` horizontally into an offscreen strip at least
    /// `viewport_width` pixels wide.
    pub fn new<C>(canvas: &mut C, image: &I, viewport_width: u32) -> Result<Self, Error>
    where
        C: Canvas<Image = I>,
    {
        let (image_w, image_h) = canvas.image_size(image);
        if image_w == 0 {
            return Err(Error::Allocation {
                width: image_w,
                height: image_h,
            });
        }
        let repeat = viewport_width.div_ceil(image_w).max(1);
        // backgrounds are built at startup, where a missing target is fatal
        let strip = canvas
            .create_image(image_w * repeat, image_h)
            .map_err(|err| match err {
                RenderError::TargetAllocation { width, height } => {
                    Error::Allocation { width, height }
                }
                other => Error::Render(other),
            })?;

        canvas.set_target(Some(&strip))?;
        let drawn = (0..repeat).try_for_each(|i| {
            let dest = Rect::new((i * image_w) as f32, 0.0, image_w as f32, image_h as f32);
            canvas.blit(image, None, dest, false)
        });
        canvas.set_target(None)?;
        drawn?;

        Ok(Self {
            strip,
            width: (image_w * repeat) as f64,
            height: image_h as f64,
            world_x: 0.0,
            velocity: 0.0,
            scroll_right: false,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Keeps `world_x` within `[-width, width]`, then moves it by `velocity`.
    pub fn scroll(&mut self) {
        self.wrap();
        if self.velocity > 0.0 {
            if self.scroll_right {
                self.world_x += self.velocity;
            } else {
                self.world_x -= self.velocity;
            }
        }
    }

    fn wrap(&mut self) {
        if self.world_x < -self.width {
            self.world_x = self.width;
        } else if self.world_x > self.width {
            self.world_x = -self.width;
        }
    }

    /// Screen x of both copies of the strip.
    pub fn copy_positions(&self) -> (f64, f64) {
        let a = self.world_x;
        let b = if a > 0.0 { a - self.width } else { a + self.width };
        (a, b)
    }

    /// Draws both copies with the strip's bottom on `bottom`, a world y.
    pub fn draw<C>(&self, canvas: &mut C, bottom: f64, camera: Vec2) -> Result<(), RenderError>
    where
        C: Canvas<Image = I>,
    {
        let y = (bottom - self.height) as f32 - camera.y;
        let (a, b) = self.copy_positions();
        for x in [a, b] {
            let dest = Rect::new(x as f32, y, self.width as f32, self.height as f32);
            canvas.blit(&self.strip, None, dest, false)?;
        }
        Ok(())
    }
}

/// Layer velocities, back to front. The front layer moves at half the
/// player's speed and stands still while the camera is locked.
pub fn parallax_velocities(player_velocity_x: f64, camera_locked: bool) -> [f64; BACKGROUND_LAYERS] {
    let front = if camera_locked {
        0.0
    } else {
        player_velocity_x / 2.0
    };
    [front / 5.0, front / 4.0, front / 3.0, front / 2.0, front]
}
