use crate::assets::store::SpriteSheet;

/// Per-entity sprite and animation state.
/// Which sheet is shown is behavior-driven; frame stepping happens at the
/// render handoff, matching the sheet's own speed.
#[derive(Debug, Clone)]
pub struct SpriteState {
    /// Catalog name of the current sheet.
    pub key: String,
    pub frame_index: u32,
    pub frame_step: u32,
    /// Horizontal mirroring; also mirrors the collision-box offset.
    pub x_flip: bool,
}

impl SpriteState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            frame_index: 0,
            frame_step: 0,
            x_flip: false,
        }
    }

    /// Switch sheets, restarting the animation only on an actual change.
    pub fn set(&mut self, key: &str) {
        if self.key != key {
            self.key = key.to_string();
            self.frame_index = 0;
            self.frame_step = 0;
        }
    }

    /// Advance the frame counter for one rendered frame.
    pub fn step(&mut self, sheet: &SpriteSheet) {
        if sheet.frames <= 1 {
            return;
        }
        self.frame_step += 1;
        if self.frame_step > sheet.frame_speed {
            self.frame_step = 0;
            self.frame_index = (self.frame_index + 1) % sheet.frames;
        }
    }
}
