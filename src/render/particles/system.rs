//! 粒子系统调度
//!
//! 把世界的粒子桶接入 ECS 调度，每帧按 `FrameTime` 推进播放时间。

use crate::world::game_world::GameWorld;
use bevy_ecs::prelude::*;

/// 本帧时长
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameTime {
    /// 帧间隔（毫秒）
    pub delta_ms: u64,
}

/// 推进所有粒子槽位的播放时间
pub fn tick_particles_system(time: Res<FrameTime>, mut world: ResMut<GameWorld>) {
    if time.delta_ms > 0 {
        world.tick(time.delta_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::render::particles::decl::{ParticleDecl, ParticleDeclRegistry};
    use crate::render::particles::emitter::PfxEmitter;

    #[test]
    fn test_system_ticks_world() {
        let mut registry = ParticleDeclRegistry::new();
        let decl = registry
            .insert(ParticleDecl::new("FLASH").with_preffered_time(100))
            .unwrap();
        let game_world = GameWorld::new(WorldConfig::default(), registry);
        let mut flash = PfxEmitter::from_decl(&game_world, &decl);
        flash.set_active(true);

        let mut ecs = World::new();
        ecs.insert_resource(game_world);
        ecs.insert_resource(FrameTime { delta_ms: 60 });

        let mut schedule = Schedule::default();
        schedule.add_systems(tick_particles_system);

        schedule.run(&mut ecs);
        assert!(flash.is_active());
        schedule.run(&mut ecs);
        assert!(!flash.is_active());
    }
}
