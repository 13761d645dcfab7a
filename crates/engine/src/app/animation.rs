/// Frame clock for a horizontal sprite strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animator {
    frame_count: u32,
    frame_duration: f32,
    looping: bool,
    elapsed: f32,
}

impl Animator {
    pub fn new(frame_count: u32, frame_duration: f32, looping: bool) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_duration: if frame_duration.is_finite() && frame_duration > 0.0 {
                frame_duration
            } else {
                0.1
            },
            looping,
            elapsed: 0.0,
        }
    }

    pub fn total_duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_duration
    }

    pub fn advance(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let total = self.total_duration();
        self.elapsed += dt;
        if self.looping {
            while self.elapsed >= total {
                self.elapsed -= total;
            }
        } else if self.elapsed > total {
            self.elapsed = total;
        }
    }

    pub fn frame_index(&self) -> u32 {
        let frame = (self.elapsed / self.frame_duration).floor() as u32;
        frame.min(self.frame_count - 1)
    }

    /// Non-looping strips are done once every frame has been shown.
    pub fn is_done(&self) -> bool {
        !self.looping && self.elapsed >= self.total_duration()
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }
}
