//! 粒子发射器句柄
//!
//! `PfxEmitter` 只持有桶的弱引用和槽位 id，发射器的实际状态保存在
//! `ParticleBucket` 中。句柄不可复制，同一时刻一个槽位只属于一个句柄：
//! 移动转移所有权，`Drop` 把仍绑定的槽位归还给桶。
//!
//! 空句柄上的所有修改器都是空操作，调用方无需先检查 `is_empty()`。
//!
//! 注意：不要在持有桶锁时丢弃句柄，`Drop` 需要重新获取该锁。

use crate::core::error::{ParticleError, ParticleResult};
use crate::render::particles::bucket::{lock_bucket, ParticleBucket, SharedBucket, SlotId};
use crate::render::particles::decl::ParticleDecl;
use crate::render::particles::mesh::{EmitterMesh, Pose};
use crate::world::game_world::GameWorld;
use crate::world::vob::{VobDescriptor, VobKind};
use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};
use std::sync::{Arc, Mutex, Weak};

#[derive(Debug)]
struct Binding {
    bucket: Weak<Mutex<ParticleBucket>>,
    id: SlotId,
}

/// 粒子发射器句柄
#[derive(Component, Debug, Default)]
pub struct PfxEmitter {
    binding: Option<Binding>,
}

impl PfxEmitter {
    /// 空句柄
    pub fn empty() -> Self {
        Self::default()
    }

    /// 在给定桶中为声明分配槽位
    pub fn try_with_bucket(
        bucket: &SharedBucket,
        decl: &Arc<ParticleDecl>,
    ) -> ParticleResult<Self> {
        let id = lock_bucket(bucket).alloc(decl)?;
        Ok(Self {
            binding: Some(Binding {
                bucket: Arc::downgrade(bucket),
                id,
            }),
        })
    }

    /// 在给定桶中为声明分配槽位，失败时返回空句柄
    pub fn with_bucket(bucket: &SharedBucket, decl: &Arc<ParticleDecl>) -> Self {
        Self::try_with_bucket(bucket, decl).unwrap_or_else(|err| {
            tracing::warn!(target: "particles", "Emitter {} not created: {}", decl.name, err);
            Self::empty()
        })
    }

    /// 使用世界的桶为声明分配槽位
    pub fn from_decl(world: &GameWorld, decl: &Arc<ParticleDecl>) -> Self {
        Self::with_bucket(world.bucket(), decl)
    }

    /// 按特效名查找声明并分配槽位
    pub fn try_from_name(world: &GameWorld, name: &str) -> ParticleResult<Self> {
        let decl = world
            .find_particle_decl(name)
            .ok_or_else(|| ParticleError::UnknownEffect(name.to_string()))?;
        Self::try_with_bucket(world.bucket(), &decl)
    }

    /// 按特效名创建，名字无法解析时返回空句柄
    pub fn from_name(world: &GameWorld, name: &str) -> Self {
        Self::try_from_name(world, name).unwrap_or_else(|err| {
            tracing::warn!(target: "particles", "Emitter {} not created: {}", name, err);
            Self::empty()
        })
    }

    /// 从关卡中放置的粒子 VOB 创建
    ///
    /// 放置的特效立即启用并循环播放。
    pub fn try_from_vob(world: &GameWorld, vob: &VobDescriptor) -> ParticleResult<Self> {
        let VobKind::Pfx { visual } = &vob.kind else {
            return Err(ParticleError::NotAnEmitterVob(vob.name.clone()));
        };
        let mut emitter = Self::try_from_name(world, visual)?;
        emitter.set_obj_matrix(vob.transform());
        emitter.set_active(true);
        emitter.set_looped(true);
        Ok(emitter)
    }

    /// 从关卡 VOB 创建，失败时返回空句柄
    pub fn from_vob(world: &GameWorld, vob: &VobDescriptor) -> Self {
        Self::try_from_vob(world, vob).unwrap_or_else(|err| {
            tracing::warn!(target: "particles", "Vob {} has no emitter: {}", vob.name, err);
            Self::empty()
        })
    }

    /// 取走槽位所有权，原句柄变为空
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// 没有绑定槽位（或桶已销毁）时为 `true`
    pub fn is_empty(&self) -> bool {
        self.binding
            .as_ref()
            .map_or(true, |binding| binding.bucket.strong_count() == 0)
    }

    /// 绑定的槽位 id
    pub fn slot_id(&self) -> Option<SlotId> {
        self.binding.as_ref().map(|binding| binding.id)
    }

    fn access<R>(&self, f: impl FnOnce(&mut ParticleBucket, SlotId) -> R) -> Option<R> {
        let binding = self.binding.as_ref()?;
        let bucket = binding.bucket.upgrade()?;
        let mut guard = lock_bucket(&bucket);
        Some(f(&mut guard, binding.id))
    }

    pub fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.set_position(Vec3::new(x, y, z));
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.access(|bucket, id| bucket.set_position(id, position));
    }

    /// 设置定向特效的目标点
    pub fn set_target(&mut self, target: Vec3) {
        self.access(|bucket, id| bucket.set_target(id, target));
    }

    /// 设置朝向，不改变位置
    pub fn set_direction(&mut self, direction: Mat4) {
        self.access(|bucket, id| bucket.set_direction(id, direction));
    }

    /// 一次性设置完整世界变换
    pub fn set_obj_matrix(&mut self, matrix: Mat4) {
        self.access(|bucket, id| bucket.set_obj_matrix(id, matrix));
    }

    pub fn set_active(&mut self, active: bool) {
        self.access(|bucket, id| bucket.set_active(id, active));
    }

    /// 桶中的启用状态；空句柄返回 `false`
    pub fn is_active(&self) -> bool {
        self.access(|bucket, id| bucket.is_active(id))
            .unwrap_or(false)
    }

    pub fn set_looped(&mut self, looped: bool) {
        self.access(|bucket, id| bucket.set_looped(id, looped));
    }

    /// 挂载蒙皮网格，粒子从姿态驱动的网格表面发出
    pub fn set_mesh(&mut self, mesh: Option<Arc<EmitterMesh>>, pose: Option<Arc<Pose>>) {
        self.access(|bucket, id| bucket.set_mesh(id, mesh, pose));
    }

    /// 特效声明的建议时长（毫秒）；空句柄返回 0
    pub fn effect_preffered_time(&self) -> u64 {
        self.access(|bucket, id| bucket.slot(id).map(|slot| slot.decl().preffered_time()))
            .flatten()
            .unwrap_or(0)
    }

    /// 绑定的特效声明
    pub fn decl(&self) -> Option<Arc<ParticleDecl>> {
        self.access(|bucket, id| bucket.slot(id).map(|slot| Arc::clone(slot.decl())))
            .flatten()
    }

    pub fn world_transform(&self) -> Option<Mat4> {
        self.access(|bucket, id| bucket.slot(id).map(|slot| slot.world_transform()))
            .flatten()
    }

    pub fn has_trail(&self) -> bool {
        self.access(|bucket, id| bucket.slot(id).is_some_and(|slot| slot.trail().is_some()))
            .unwrap_or(false)
    }

    /// 拖尾历史点（从旧到新）
    pub fn trail_points(&self) -> Vec<Vec3> {
        self.access(|bucket, id| {
            bucket
                .slot(id)
                .and_then(|slot| slot.trail())
                .map(|trail| trail.points().collect())
        })
        .flatten()
        .unwrap_or_default()
    }

    /// 网格表面发射点
    pub fn emission_points(&self) -> Vec<Vec3> {
        self.access(|bucket, id| bucket.slot(id).map(|slot| slot.emission_points()))
            .flatten()
            .unwrap_or_default()
    }
}

impl Drop for PfxEmitter {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            if let Some(bucket) = binding.bucket.upgrade() {
                lock_bucket(&bucket).free(binding.id);
            }
        }
    }
}
