use crate::assets::image::ImageData;

/// Engine configuration, provided by the host.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Viewport width in pixels.
    pub view_width: u32,
    /// Viewport height in pixels.
    pub view_height: u32,
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            view_width: 32,
            view_height: 32,
            fixed_dt: 1.0 / 60.0,
        }
    }
}

/// Asynchronous image source implemented by the host.
///
/// The engine never blocks on a load: it calls `request` once, then `take`
/// every tick until the load completes. Stages depending on an image idle
/// until it resolves.
pub trait AssetLoader {
    /// Begin loading the image at `path`. Idempotent for an in-flight path.
    fn request(&mut self, path: &str);

    /// Take the finished result for `path`, if any.
    /// Returns None while the load is still in flight; a completed load is
    /// handed over exactly once.
    fn take(&mut self, path: &str) -> Option<Result<ImageData, String>>;
}

/// Pixel-addressable output surface implemented by the host.
pub trait Renderer {
    /// Draw a sub-rectangle of `image` at integer screen coordinates with
    /// source-over alpha compositing and optional horizontal mirroring.
    #[allow(clippy::too_many_arguments)]
    fn blit(
        &mut self,
        image: &ImageData,
        screen_x: i32,
        screen_y: i32,
        src_x: u32,
        src_y: u32,
        src_w: u32,
        src_h: u32,
        hflip: bool,
    );
}

/// Best-effort event sink. Failures are the sink's problem, never the
/// simulation's.
pub trait TelemetrySink {
    fn emit(&mut self, event: &str, payload: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sixty_hertz() {
        let cfg = EngineConfig::default();
        assert!((cfg.fixed_dt - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(cfg.view_width, 32);
    }
}
