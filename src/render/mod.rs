//! 渲染侧的世界对象
//!
//! 这里只包含粒子发射器的池化与生命周期，不包含实际的绘制与模拟。

pub mod particles;

pub use particles::{ParticleBucket, ParticleDecl, ParticleDeclRegistry, PfxEmitter};
