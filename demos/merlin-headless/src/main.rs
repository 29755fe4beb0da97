//! Headless demo host: a generated level, an in-memory asset loader and a
//! counting renderer stand in for a real platform layer. Runs a few seconds
//! of simulated input and prints what the engine reports.

use std::collections::HashMap;

use merlin_engine::{
    AssetLoader, Engine, EngineConfig, EngineEvent, GameCatalog, ImageData, InputEvent, Key,
    Renderer,
};

/// Everything is "decoded" up front; loads complete on the first poll.
struct MemoryLoader {
    images: HashMap<String, ImageData>,
}

impl AssetLoader for MemoryLoader {
    fn request(&mut self, _path: &str) {}

    fn take(&mut self, path: &str) -> Option<Result<ImageData, String>> {
        self.images.get(path).cloned().map(Ok)
    }
}

/// Counts blit calls instead of rasterizing them.
struct CountingRenderer {
    blits: u64,
}

impl Renderer for CountingRenderer {
    fn blit(
        &mut self,
        _image: &ImageData,
        _screen_x: i32,
        _screen_y: i32,
        _src_x: u32,
        _src_y: u32,
        _src_w: u32,
        _src_h: u32,
        _hflip: bool,
    ) {
        self.blits += 1;
    }
}

fn opaque(w: u32, h: u32) -> ImageData {
    ImageData::new(w, h, 4, vec![200; (w * h * 4) as usize])
}

/// A level image: opaque floor band, side walls, one floating platform.
fn terrain(w: u32, h: u32) -> ImageData {
    let mut pixels = vec![0u8; (w * h * 4) as usize];
    let mut solid = |x: u32, y: u32| pixels[((y * w + x) * 4 + 3) as usize] = 255;
    for x in 0..w {
        for y in (h - 6)..h {
            solid(x, y);
        }
    }
    for y in 0..h {
        solid(0, y);
        solid(w - 1, y);
    }
    for x in (w / 3)..(w / 3 + 10).min(w) {
        solid(x, h / 2);
    }
    ImageData::new(w, h, 4, pixels)
}

const CATALOG: &str = r#"{
    "sprites": {
        "merlin":       { "path": "sprites/merlin.png" },
        "merlin_walk":  { "path": "sprites/merlin.walk.png", "frames": 3, "frame_width": 5, "frame_speed": 15 },
        "troll":        { "path": "sprites/troll.png" },
        "troll_walk":   { "path": "sprites/troll.walk.png", "frames": 4, "frame_width": 12, "frame_speed": 20 },
        "altar":        { "path": "sprites/altar.png" },
        "altar_staff":  { "path": "sprites/altar.staff.png" },
        "altar_feather":{ "path": "sprites/altar.feather.png" },
        "altar_boots":  { "path": "sprites/altar.boots.png" },
        "door":         { "path": "sprites/door.png" },
        "box":          { "path": "sprites/box.png" },
        "box_active":   { "path": "sprites/box.active.png" },
        "staff":        { "path": "sprites/staff.png" },
        "staff_active": { "path": "sprites/staff.active.png" },
        "feather":      { "path": "sprites/feather.png" },
        "boots":        { "path": "sprites/boots.png" }
    },
    "levels": [
        {
            "terrain": "levels/level1.png",
            "start": { "x": 4, "y": 18 },
            "spawns": [
                { "kind": "altar", "x": 24, "y": 22, "tool": "staff" },
                { "kind": "block", "x": 34, "y": 12 },
                { "kind": "troll", "x": 46, "y": 14, "width": 9, "height": 11 },
                { "kind": "door",  "x": 61, "y": 20, "level_target": 1 }
            ]
        },
        {
            "terrain": "levels/level2.png",
            "start": { "x": 4, "y": 18 },
            "spawns": [
                { "kind": "altar", "x": 20, "y": 22, "tool": "feather" },
                { "kind": "door",  "x": 2,  "y": 20, "level_target": 0 }
            ]
        }
    ]
}"#;

fn images() -> HashMap<String, ImageData> {
    let sizes: &[(&str, u32, u32)] = &[
        ("sprites/merlin.png", 5, 8),
        ("sprites/merlin.walk.png", 15, 8),
        ("sprites/troll.png", 12, 12),
        ("sprites/troll.walk.png", 48, 12),
        ("sprites/altar.png", 6, 4),
        ("sprites/altar.staff.png", 6, 4),
        ("sprites/altar.feather.png", 6, 4),
        ("sprites/altar.boots.png", 6, 4),
        ("sprites/door.png", 2, 6),
        ("sprites/box.png", 5, 5),
        ("sprites/box.active.png", 5, 5),
        ("sprites/staff.png", 2, 6),
        ("sprites/staff.active.png", 2, 6),
        ("sprites/feather.png", 3, 3),
        ("sprites/boots.png", 4, 3),
    ];
    let mut out: HashMap<String, ImageData> = sizes
        .iter()
        .map(|&(path, w, h)| (path.to_string(), opaque(w, h)))
        .collect();
    out.insert("levels/level1.png".to_string(), terrain(64, 32));
    out.insert("levels/level2.png".to_string(), terrain(48, 32));
    out
}

fn main() {
    env_logger::init();
    log::info!("headless demo starting");

    let catalog = GameCatalog::from_json(CATALOG).expect("demo catalog parses");
    let loader = MemoryLoader { images: images() };
    let mut engine = Engine::new(
        EngineConfig {
            view_width: 32,
            view_height: 32,
            ..EngineConfig::default()
        },
        catalog,
        Box::new(loader),
        None,
    )
    .expect("engine starts");

    let mut out = CountingRenderer { blits: 0 };

    // Five seconds at 60 Hz: walk right the whole way, pressing the pointer
    // once in the middle to swing whatever tool we picked up.
    engine.on_input(InputEvent::KeyDown { key: Key::Right });
    for frame in 0..300u32 {
        if frame == 150 {
            engine.on_input(InputEvent::PointerDown { x: 20.0, y: 16.0 });
        }
        engine
            .on_frame(1.0 / 60.0, &mut out)
            .expect("tick failed");
        for event in engine.drain_events() {
            match event {
                EngineEvent::LevelChanged { index } => println!("level changed -> {index}"),
                EngineEvent::Status { lines } => {
                    for line in lines {
                        println!("status: {line}");
                    }
                }
            }
        }
    }

    let player = engine.player().expect("player is alive");
    println!(
        "after 300 frames: level {}, player at ({:.0}, {:.0}), {} blits",
        engine.level_index(),
        player.pos.x,
        player.pos.y,
        out.blits
    );
}
