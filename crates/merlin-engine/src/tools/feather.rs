use crate::tools::{Tool, ToolCtx, ToolKind};

/// Gravity while gliding, per tick.
const GLIDE_PULL: f32 = 0.02;
/// Terminal fall speed while gliding.
const GLIDE_TERMINAL: f32 = 0.3;

/// Slows the holder's fall to a drift. The down action folds the feather
/// until the next landing, dropping at full speed.
pub struct Feather {
    folded: bool,
}

impl Feather {
    pub fn new() -> Self {
        Self { folded: false }
    }
}

impl Tool for Feather {
    fn kind(&self) -> ToolKind {
        ToolKind::Feather
    }

    fn sprite(&self) -> &'static str {
        "feather"
    }

    fn gravity(&mut self, ctx: &mut ToolCtx) -> bool {
        if ctx.on_ground() {
            self.folded = false;
            return false;
        }
        if self.folded {
            return false;
        }
        if let Some(p) = ctx.player_mut() {
            p.vel.y = (p.vel.y + GLIDE_PULL).min(GLIDE_TERMINAL);
        }
        true
    }

    fn down_action(&mut self, ctx: &mut ToolCtx) {
        let _ = ctx;
        self.folded = true;
    }
}
