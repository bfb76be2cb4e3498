//! 粒子发射器模块
//!
//! ## 架构设计
//!
//! ```text
//! ┌──────────────┐   SlotId    ┌────────────────────────────┐
//! │  PfxEmitter  │ ──────────▶ │      ParticleBucket        │
//! │ (move-only)  │  Weak<桶>   │  槽位池：位置/朝向/启用/    │
//! └──────────────┘             │  循环/网格/拖尾            │
//!                              └────────────────────────────┘
//!                                          │ Arc
//!                                          ▼
//!                               ParticleDecl（只读声明）
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut fire = PfxEmitter::from_name(&world, "FIRE");
//! fire.set_position(Vec3::new(0.0, 1.0, 0.0));
//! fire.set_active(true);
//! // 名字无法解析时 fire 为空句柄，上面的调用都是空操作
//! ```

pub mod bucket;
pub mod decl;
pub mod emitter;
pub mod mesh;
pub mod system;

pub use bucket::{lock_bucket, EmitterSlot, ParticleBucket, SharedBucket, SlotId, Trail};
pub use decl::{ParticleDecl, ParticleDeclRegistry, ParticleShape, TrailDecl};
pub use emitter::PfxEmitter;
pub use mesh::{EmitterMesh, Pose, SkinnedVertex};
pub use system::{tick_particles_system, FrameTime};
