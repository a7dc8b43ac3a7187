/// A run of frames on one row of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteAnimation {
    pub frame_start: u8,
    /// Exclusive unless equal to `frame_start`
    pub frame_end: u8,
    pub row: u8,
    pub fps: f64,
}

impl Default for SpriteAnimation {
    fn default() -> Self {
        Self {
            frame_start: 0,
            frame_end: 0,
            row: 0,
            fps: 10.0,
        }
    }
}

/// Current frame of a [`SpriteAnimation`] and the time spent on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animator {
    pub animation: SpriteAnimation,
    pub frame: u8,
    pub frame_duration: f64,
}

impl Animator {
    pub fn advance(&mut self, dt: f64) {
        let anim = self.animation;
        self.frame_duration += dt;

        if self.frame < anim.frame_start {
            self.frame = anim.frame_start;
        }
        if anim.fps > 0.0 && self.frame_duration > 1.0 / anim.fps {
            self.frame = self.frame.saturating_add(1);
            self.frame_duration = 0.0;
        }
        if self.frame >= anim.frame_end {
            self.frame = anim.frame_start;
        }
    }

    pub fn reset(&mut self) {
        self.frame = self.animation.frame_start;
        self.frame_duration = 0.0;
    }
}
