//! Per-pixel occupancy store for terrain and live entities.
//!
//! Every level pixel carries the set of ids whose solid footprint covers it,
//! plus the reserved terrain id where the terrain image was opaque at load
//! time. Entity footprints are cleared and restamped every tick; terrain is
//! immutable until level teardown.

use crate::api::types::EntityId;
use crate::assets::image::{ImageData, SOLID_ALPHA};

/// Axis-aligned pixel rectangle, half-open on the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bot: i32,
}

impl PixelRect {
    pub fn new(left: i32, top: i32, right: i32, bot: i32) -> Self {
        Self {
            left,
            top,
            right,
            bot,
        }
    }

    pub fn from_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + w,
            bot: y + h,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bot - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bot <= self.top
    }

    /// Clamp to the level rectangle [0, w) x [0, h).
    pub fn clipped(&self, w: u32, h: u32) -> Self {
        Self {
            left: self.left.clamp(0, w as i32),
            top: self.top.clamp(0, h as i32),
            right: self.right.clamp(0, w as i32),
            bot: self.bot.clamp(0, h as i32),
        }
    }

    /// Grow by `margin` pixels on all four sides.
    pub fn expanded(&self, margin: i32) -> Self {
        Self {
            left: self.left - margin,
            top: self.top - margin,
            right: self.right + margin,
            bot: self.bot + margin,
        }
    }
}

/// One set of occupying ids per level pixel.
///
/// Per-pixel sets stay small (a handful of overlapping entities), so each
/// cell is a plain vec with set semantics. Queries clip silently to level
/// bounds; degenerate rectangles yield the empty set.
pub struct CollisionMap {
    width: u32,
    height: u32,
    cells: Vec<Vec<EntityId>>,
}

impl CollisionMap {
    /// An empty map with no terrain.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); (width * height) as usize],
        }
    }

    /// Build a map from a terrain image, stamping the reserved terrain id
    /// wherever the source alpha exceeds the solidity threshold.
    pub fn from_terrain(image: &ImageData) -> Self {
        let mut map = Self::new(image.width, image.height);
        for y in 0..image.height {
            for x in 0..image.width {
                if image.alpha_at(x, y) > SOLID_ALPHA {
                    map.cells[(y * image.width + x) as usize].push(EntityId::TERRAIN);
                }
            }
        }
        map
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn cell_index(&self, x: i32, y: i32) -> usize {
        (y as u32 * self.width + x as u32) as usize
    }

    /// Insert `id` into every pixel of the clipped box.
    pub fn stamp(&mut self, id: EntityId, rect: PixelRect) {
        let r = rect.clipped(self.width, self.height);
        for y in r.top..r.bot {
            for x in r.left..r.right {
                let idx = self.cell_index(x, y);
                let cell = &mut self.cells[idx];
                if !cell.contains(&id) {
                    cell.push(id);
                }
            }
        }
    }

    /// Remove `id` from every pixel of the clipped box.
    pub fn clear(&mut self, id: EntityId, rect: PixelRect) {
        let r = rect.clipped(self.width, self.height);
        for y in r.top..r.bot {
            for x in r.left..r.right {
                let idx = self.cell_index(x, y);
                self.cells[idx].retain(|&other| other != id);
            }
        }
    }

    /// Union of ids occupying the clipped rectangle, terrain included.
    pub fn query(&self, rect: PixelRect) -> Vec<EntityId> {
        let r = rect.clipped(self.width, self.height);
        let mut hits = Vec::new();
        for y in r.top..r.bot {
            for x in r.left..r.right {
                for &id in &self.cells[self.cell_index(x, y)] {
                    if !hits.contains(&id) {
                        hits.push(id);
                    }
                }
            }
        }
        hits
    }

    /// Whether anything occupies the clipped rectangle. Early-exits, so an
    /// edge probe costs time proportional to its own extent.
    pub fn occupied(&self, rect: PixelRect) -> bool {
        let r = rect.clipped(self.width, self.height);
        for y in r.top..r.bot {
            for x in r.left..r.right {
                if !self.cells[self.cell_index(x, y)].is_empty() {
                    return true;
                }
            }
        }
        false
    }
}
