use crate::error::{LoadError, RenderError};
use crate::render::Canvas;
use macroquad::prelude::*;
use std::path::{Path, PathBuf};

/// Image handle of the headless canvas: an id plus its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessImage {
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SetTarget(Option<usize>),
    Fill(Color),
    Blit {
        image: usize,
        src: Option<Rect>,
        dest: Rect,
        flip_x: bool,
    },
}

/// A `Canvas` that draws nothing and records every call. Used for
/// simulation without a window and to observe rendering in tests.
#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    next_id: usize,
    pub calls: Vec<DrawCall>,
    pub loaded: Vec<PathBuf>,
    pub created: usize,
    /// When set, `create_image` fails as if the target could not be created
    pub fail_allocations: bool,
    /// Size reported for images loaded from disk
    pub loaded_image_size: (u32, u32),
}

impl HeadlessCanvas {
    pub fn new() -> Self {
        Self {
            loaded_image_size: (256, 256),
            ..Default::default()
        }
    }

    fn alloc(&mut self, width: u32, height: u32) -> HeadlessImage {
        let id = self.next_id;
        self.next_id += 1;
        HeadlessImage { id, width, height }
    }

    pub fn blits(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Blit { .. }))
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Canvas for HeadlessCanvas {
    type Image = HeadlessImage;

    fn load_image(&mut self, path: &Path) -> Result<HeadlessImage, LoadError> {
        self.loaded.push(path.to_path_buf());
        let (w, h) = self.loaded_image_size;
        Ok(self.alloc(w, h))
    }

    fn create_image(&mut self, width: u32, height: u32) -> Result<HeadlessImage, RenderError> {
        if self.fail_allocations || width == 0 || height == 0 {
            return Err(RenderError::TargetAllocation { width, height });
        }
        self.created += 1;
        Ok(self.alloc(width, height))
    }

    fn image_size(&self, image: &HeadlessImage) -> (u32, u32) {
        (image.width, image.height)
    }

    fn set_target(&mut self, target: Option<&HeadlessImage>) -> Result<(), RenderError> {
        self.calls.push(DrawCall::SetTarget(target.map(|t| t.id)));
        Ok(())
    }

    fn fill(&mut self, color: Color) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Fill(color));
        Ok(())
    }

    fn blit(
        &mut self,
        image: &HeadlessImage,
        src: Option<Rect>,
        dest: Rect,
        flip_x: bool,
    ) -> Result<(), RenderError> {
        self.calls.push(DrawCall::Blit {
            image: image.id,
            src,
            dest,
            flip_x,
        });
        Ok(())
    }
}
