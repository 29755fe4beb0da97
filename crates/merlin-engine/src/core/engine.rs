//! The engine loop: level lifecycle plus the fixed per-tick pipeline.
//!
//! Single-threaded and cooperative. The host drives it (`on_tick` for one
//! fixed step, `on_frame` to convert wall-clock frame time into steps) and
//! everything shared mutates in one fixed intra-tick stage order: behavior
//! hooks, movement + occupancy, collision dispatch, deferred drains, then
//! the render handoff.

use crate::api::host::{AssetLoader, EngineConfig, Renderer, TelemetrySink};
use crate::api::types::{EngineEvent, EntityId};
use crate::assets::catalog::GameCatalog;
use crate::assets::store::SpriteStore;
use crate::components::entity::Entity;
use crate::core::collision::CollisionMap;
use crate::core::level::{self, LevelDirector, LevelPhase, SimContext};
use crate::core::registry::EntityRegistry;
use crate::core::time::TickClock;
use crate::error::EngineError;
use crate::input::controls::{ControlState, InputEvent};
use crate::renderer::camera::Camera;
use crate::systems::behavior::{behavior_stage, dispatch_collisions, BehaviorCtx};
use crate::systems::{movement, render};
use crate::tools::PlayerProgress;

pub struct Engine {
    catalog: GameCatalog,
    loader: Box<dyn AssetLoader>,
    telemetry: Option<Box<dyn TelemetrySink>>,
    time: TickClock,
    camera: Camera,
    sprites: SpriteStore,
    controls: ControlState,
    registry: EntityRegistry,
    map: Option<CollisionMap>,
    director: LevelDirector,
    sim: SimContext,
    progress: PlayerProgress,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Build an engine and begin loading the first catalog level.
    pub fn new(
        config: EngineConfig,
        catalog: GameCatalog,
        loader: Box<dyn AssetLoader>,
        telemetry: Option<Box<dyn TelemetrySink>>,
    ) -> Result<Self, EngineError> {
        let sprites = SpriteStore::new(catalog.sprites.clone());
        let mut engine = Self {
            time: TickClock::new(config.fixed_dt),
            camera: Camera::new(config.view_width, config.view_height),
            sim: SimContext::new(config.view_width, config.view_height),
            catalog,
            loader,
            telemetry,
            sprites,
            controls: ControlState::new(),
            registry: EntityRegistry::new(),
            map: None,
            director: LevelDirector::new(),
            progress: PlayerProgress::default(),
            events: Vec::new(),
        };
        engine.sprites.request_all(&mut *engine.loader);
        engine.begin_level(0)?;
        Ok(engine)
    }

    /// Reset the playthrough: carried tool state gone, back to level 0.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        log::info!("new game");
        self.progress = PlayerProgress::default();
        self.events.clear();
        self.begin_level(0)
    }

    /// Fold a host input event into the polled control state.
    pub fn on_input(&mut self, event: InputEvent) {
        self.controls.apply(event);
    }

    /// Advance by one frame's wall-clock time, running however many fixed
    /// ticks that covers.
    pub fn on_frame(&mut self, frame_dt: f32, renderer: &mut dyn Renderer) -> Result<(), EngineError> {
        for _ in 0..self.time.advance(frame_dt) {
            self.on_tick(renderer)?;
        }
        Ok(())
    }

    /// Run exactly one fixed simulation tick.
    pub fn on_tick(&mut self, renderer: &mut dyn Renderer) -> Result<(), EngineError> {
        if let LevelPhase::Transitioning { target } = self.director.phase {
            // Frame boundary reached: tear down and start the next load.
            self.begin_level(target)?;
        }
        if self.director.phase == LevelPhase::Loading {
            self.poll_loading()?;
        }
        if self.director.phase != LevelPhase::Playing {
            // Assets still pending; everything idles in place, unrendered.
            return Ok(());
        }
        let Some(map) = self.map.as_mut() else {
            return Ok(());
        };

        // Pointer translation uses this tick's camera snapshot.
        self.sim.camera_pos = self.camera.pos;
        if let Some(screen) = self.controls.take_cast() {
            self.sim.cast_at = Some(self.camera.to_world(screen));
        }

        // 1. behavior hooks
        {
            let mut ctx = BehaviorCtx {
                registry: &mut self.registry,
                map,
                controls: &self.controls,
                sim: &mut self.sim,
                progress: &mut self.progress,
                events: &mut self.events,
                telemetry: self.telemetry.as_deref_mut(),
            };
            behavior_stage(&mut ctx);
        }

        // 2. movement resolution + occupancy update
        for id in self.registry.ids() {
            let Some(e) = self.registry.get_mut(id) else {
                continue;
            };
            let Some(sheet) = self.sprites.get(&e.sprite.key) else {
                continue; // deferred activation until the sheet resolves
            };
            movement::resolve(e, sheet, map);
            movement::refresh_occupancy(e, sheet, map);
        }

        // 3. collision dispatch
        {
            let mut ctx = BehaviorCtx {
                registry: &mut self.registry,
                map,
                controls: &self.controls,
                sim: &mut self.sim,
                progress: &mut self.progress,
                events: &mut self.events,
                telemetry: self.telemetry.as_deref_mut(),
            };
            dispatch_collisions(&mut ctx);
        }

        // 4. deferred deletions, then queued spawns
        self.registry.drain_deletions(map);
        let queued = std::mem::take(&mut self.sim.spawn_queue);
        for desc in &queued {
            level::spawn_from(desc, &mut self.registry, &mut self.sim, &self.progress);
        }

        if let Some(target) = self.sim.pending_level.take() {
            self.director.phase = LevelPhase::Transitioning { target };
            if let Some(t) = self.telemetry.as_mut() {
                t.emit("level_change", &target.to_string());
            }
        }

        // 5. camera follow + render handoff
        if let Some(focus) = self.sim.focus.and_then(|id| self.registry.get(id)) {
            self.camera.follow(focus.pos);
        }
        render::render_stage(
            &mut self.registry,
            &self.sprites,
            &self.camera,
            self.director.terrain.as_ref(),
            renderer,
        );
        Ok(())
    }

    /// Drain pending engine events (level changes, status notifications).
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn level_index(&self) -> usize {
        self.director.index
    }

    pub fn is_playing(&self) -> bool {
        self.director.phase == LevelPhase::Playing
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.sim.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.sim.player.and_then(|id| self.registry.get(id))
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Tear down the current level and begin loading `index`.
    fn begin_level(&mut self, index: usize) -> Result<(), EngineError> {
        let level = self
            .catalog
            .level(index)
            .ok_or(EngineError::BadLevelIndex(index))?
            .clone();
        log::info!("loading level {index} ({})", level.terrain);

        self.registry.clear();
        self.map = None;
        self.sim.reset();
        self.director = LevelDirector {
            index,
            phase: LevelPhase::Loading,
            terrain_path: level.terrain.clone(),
            terrain: None,
        };

        self.loader.request(&level.terrain);
        level::spawn_player(level.start, &mut self.registry, &mut self.sim, &self.progress);
        for desc in &level.spawns {
            level::spawn_from(desc, &mut self.registry, &mut self.sim, &self.progress);
        }
        Ok(())
    }

    /// Poll in-flight assets; flip to Playing once the terrain resolves.
    fn poll_loading(&mut self) -> Result<(), EngineError> {
        self.sprites.poll_pending(&mut *self.loader)?;
        if self.director.terrain.is_some() {
            return Ok(());
        }
        match self.loader.take(&self.director.terrain_path) {
            None => Ok(()),
            Some(Ok(image)) => {
                log::info!(
                    "level {} terrain ready ({}x{})",
                    self.director.index,
                    image.width,
                    image.height
                );
                self.map = Some(CollisionMap::from_terrain(&image));
                self.director.terrain = Some(image);
                self.director.phase = LevelPhase::Playing;
                self.events.push(EngineEvent::LevelChanged {
                    index: self.director.index,
                });
                if let Some(t) = self.telemetry.as_mut() {
                    t.emit("level_start", &self.director.index.to_string());
                }
                Ok(())
            }
            Some(Err(reason)) => {
                log::error!(
                    "level {} terrain `{}` failed: {reason}",
                    self.director.index,
                    self.director.terrain_path
                );
                Err(EngineError::TerrainLoad {
                    index: self.director.index,
                    path: self.director.terrain_path.clone(),
                    reason,
                })
            }
        }
    }
}
