//! # Game World
//!
//! World-side glue for a 3D role-playing game engine.
//!
//! ## Features
//!
//! - **Pooled particle emitters**: `PfxEmitter` is a move-only handle to a slot in a
//!   shared `ParticleBucket`; dropping the handle returns the slot
//! - **Zone triggers**: change-level triggers that ask the world for a level transition
//!   when the player walks into them
//! - **Level data**: serde-based VOB descriptors loaded from JSON or TOML
//! - **ECS integration**: `GameWorld` is a bevy_ecs `Resource`, emitters are `Component`s
//!
//! ### Example
//!
//! ```ignore
//! use game_world::prelude::*;
//!
//! let mut world = GameWorld::new(WorldConfig::default(), registry);
//! world.load_level(&LevelData::from_file("oldworld.json")?)?;
//! world.check_zones(&player);
//! if let Some(request) = world.take_change_request() {
//!     // load request.level_name, spawn at request.start_vob_name
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Error types and helper macros
//! - [`config`]: Configuration and logging setup
//! - [`render`]: Particle declarations, bucket manager and emitter handles
//! - [`world`]: Level data, triggers and the game world

/// Error types and helper macros
pub mod core;
/// Configuration system
pub mod config;
/// Particle emitter pooling
pub mod render;
/// Level data, triggers and the game world
pub mod world;

/// Commonly used types
pub mod prelude {
    pub use crate::config::{init_logging, LoggingConfig, WorldConfig};
    pub use crate::core::{LevelError, ParticleError, WorldError, WorldResult};
    pub use crate::render::particles::{
        EmitterMesh, FrameTime, ParticleBucket, ParticleDecl, ParticleDeclRegistry, PfxEmitter,
        Pose, SharedBucket, SlotId,
    };
    pub use crate::world::{
        ChangeWorld, ChangeWorldRequest, GameWorld, Intersector, LevelData, Trigger,
        VobDescriptor, VobKind, ZoneTrigger,
    };
}
