use std::collections::HashMap;

use crate::api::host::AssetLoader;
use crate::assets::catalog::SpriteDescriptor;
use crate::assets::image::ImageData;
use crate::error::EngineError;

/// A decoded sprite sheet plus its frame metadata.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub image: ImageData,
    pub frames: u32,
    pub frame_width: u32,
    pub frame_speed: u32,
}

impl SpriteSheet {
    pub fn frame_height(&self) -> u32 {
        self.image.height
    }
}

/// Holds every sprite sheet the catalog names, resolving them as the host's
/// loader completes. Lookups simply miss while a sheet is still in flight;
/// callers idle on a miss rather than treating it as an error.
pub struct SpriteStore {
    descriptors: HashMap<String, SpriteDescriptor>,
    sheets: HashMap<String, SpriteSheet>,
    pending: Vec<String>,
}

impl SpriteStore {
    pub fn new(descriptors: HashMap<String, SpriteDescriptor>) -> Self {
        Self {
            descriptors,
            sheets: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Kick off loads for every catalog sprite. Called once at startup.
    pub fn request_all(&mut self, loader: &mut dyn AssetLoader) {
        for (name, desc) in &self.descriptors {
            loader.request(&desc.path);
            self.pending.push(name.clone());
        }
        self.pending.sort();
    }

    /// Collect any loads that finished since the last tick.
    /// A failed sprite decode is fatal: the level cannot sensibly run with
    /// entities that can never resolve.
    pub fn poll_pending(&mut self, loader: &mut dyn AssetLoader) -> Result<(), EngineError> {
        let mut i = 0;
        while i < self.pending.len() {
            let name = &self.pending[i];
            let path = &self.descriptors[name].path;
            match loader.take(path) {
                None => i += 1,
                Some(Ok(image)) => {
                    let name = self.pending.swap_remove(i);
                    let desc = &self.descriptors[&name];
                    let frame_width = desc.frame_width.unwrap_or(image.width);
                    log::debug!("sprite `{}` resolved ({}x{})", name, image.width, image.height);
                    self.sheets.insert(
                        name,
                        SpriteSheet {
                            image,
                            frames: desc.frames,
                            frame_width,
                            frame_speed: desc.frame_speed,
                        },
                    );
                }
                Some(Err(reason)) => {
                    let name = self.pending.swap_remove(i);
                    let path = self.descriptors[&name].path.clone();
                    return Err(EngineError::SpriteLoad { name, path, reason });
                }
            }
        }
        Ok(())
    }

    /// Whether any sheets are still loading.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Look up a resolved sheet. None while still loading or unknown.
    pub fn get(&self, name: &str) -> Option<&SpriteSheet> {
        self.sheets.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::catalog::SpriteDescriptor;

    struct FakeLoader {
        ready: HashMap<String, ImageData>,
        failed: HashMap<String, String>,
    }

    impl AssetLoader for FakeLoader {
        fn request(&mut self, _path: &str) {}

        fn take(&mut self, path: &str) -> Option<Result<ImageData, String>> {
            if let Some(img) = self.ready.remove(path) {
                return Some(Ok(img));
            }
            self.failed.remove(path).map(Err)
        }
    }

    fn descriptor(path: &str, frames: u32, frame_width: Option<u32>) -> SpriteDescriptor {
        SpriteDescriptor {
            path: path.to_string(),
            frames,
            frame_width,
            frame_speed: 10,
        }
    }

    fn blank_image(w: u32, h: u32) -> ImageData {
        ImageData::new(w, h, 4, vec![0; (w * h * 4) as usize])
    }

    #[test]
    fn resolves_when_loader_completes() {
        let mut descriptors = HashMap::new();
        descriptors.insert("hero".to_string(), descriptor("hero.png", 3, Some(5)));
        let mut store = SpriteStore::new(descriptors);

        let mut loader = FakeLoader {
            ready: HashMap::new(),
            failed: HashMap::new(),
        };
        store.request_all(&mut loader);
        store.poll_pending(&mut loader).unwrap();
        assert!(store.get("hero").is_none());
        assert!(store.has_pending());

        loader.ready.insert("hero.png".to_string(), blank_image(15, 6));
        store.poll_pending(&mut loader).unwrap();
        let sheet = store.get("hero").unwrap();
        assert_eq!(sheet.frames, 3);
        assert_eq!(sheet.frame_width, 5);
        assert_eq!(sheet.frame_height(), 6);
        assert!(!store.has_pending());
    }

    #[test]
    fn frame_width_defaults_to_image_width() {
        let mut descriptors = HashMap::new();
        descriptors.insert("rock".to_string(), descriptor("rock.png", 1, None));
        let mut store = SpriteStore::new(descriptors);
        let mut loader = FakeLoader {
            ready: [("rock.png".to_string(), blank_image(7, 7))].into(),
            failed: HashMap::new(),
        };
        store.request_all(&mut loader);
        store.poll_pending(&mut loader).unwrap();
        assert_eq!(store.get("rock").unwrap().frame_width, 7);
    }

    #[test]
    fn failed_decode_is_fatal() {
        let mut descriptors = HashMap::new();
        descriptors.insert("bad".to_string(), descriptor("bad.png", 1, None));
        let mut store = SpriteStore::new(descriptors);
        let mut loader = FakeLoader {
            ready: HashMap::new(),
            failed: [("bad.png".to_string(), "corrupt".to_string())].into(),
        };
        store.request_all(&mut loader);
        let err = store.poll_pending(&mut loader).unwrap_err();
        assert!(matches!(err, EngineError::SpriteLoad { .. }));
    }
}
