//! 粒子桶管理器
//!
//! 发射器状态集中存放在桶内的槽位池中，外部只持有 `SlotId`。
//! 槽位释放后索引进入空闲列表，代数（generation）递增，
//! 因此过期的 `SlotId` 永远不会命中被复用的槽位。

use crate::config::ParticleConfig;
use crate::core::error::{ParticleError, ParticleResult};
use crate::render::particles::decl::ParticleDecl;
use crate::render::particles::mesh::{EmitterMesh, Pose};
use glam::{Mat4, Vec3};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 共享的粒子桶
pub type SharedBucket = Arc<Mutex<ParticleBucket>>;

/// 锁定桶
///
/// 槽位状态是纯数据，锁中毒时直接取回内部数据继续使用。
pub fn lock_bucket(bucket: &Mutex<ParticleBucket>) -> MutexGuard<'_, ParticleBucket> {
    bucket.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 桶内槽位标识（索引 + 代数）
///
/// 只能由 `ParticleBucket` 构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u32,
    generation: u32,
}

impl SlotId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// 拖尾历史点
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec3>,
    max_points: usize,
    width: f32,
}

impl Trail {
    fn new(max_points: usize, width: f32) -> Self {
        Self {
            points: VecDeque::with_capacity(max_points),
            max_points,
            width,
        }
    }

    fn push(&mut self, point: Vec3) {
        if self.points.back() == Some(&point) {
            return;
        }
        if self.points.len() == self.max_points {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// 从旧到新的历史点
    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn width(&self) -> f32 {
        self.width
    }
}

/// 单个发射器的实时状态
#[derive(Debug, Clone)]
pub struct EmitterSlot {
    decl: Arc<ParticleDecl>,
    position: Vec3,
    /// 只含旋转/缩放，平移保存在 `position`
    direction: Mat4,
    target: Option<Vec3>,
    active: bool,
    looped: bool,
    elapsed_ms: u64,
    mesh: Option<Arc<EmitterMesh>>,
    pose: Option<Arc<Pose>>,
    trail: Option<Trail>,
}

impl EmitterSlot {
    fn new(decl: &Arc<ParticleDecl>, default_trail_length: usize) -> Self {
        let trail = decl
            .trail
            .as_ref()
            .map(|t| Trail::new(t.length.unwrap_or(default_trail_length).max(1), t.width));
        Self {
            decl: Arc::clone(decl),
            position: Vec3::ZERO,
            direction: Mat4::IDENTITY,
            target: None,
            active: false,
            looped: decl.looped,
            elapsed_ms: 0,
            mesh: None,
            pose: None,
            trail,
        }
    }

    pub fn decl(&self) -> &Arc<ParticleDecl> {
        &self.decl
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Mat4 {
        self.direction
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn mesh(&self) -> Option<&Arc<EmitterMesh>> {
        self.mesh.as_ref()
    }

    pub fn pose(&self) -> Option<&Arc<Pose>> {
        self.pose.as_ref()
    }

    pub fn trail(&self) -> Option<&Trail> {
        self.trail.as_ref()
    }

    /// 世界变换
    pub fn world_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position) * self.direction
    }

    /// 网格表面发射点；未挂载网格时为空
    pub fn emission_points(&self) -> Vec<Vec3> {
        match &self.mesh {
            Some(mesh) => mesh.surface_points(self.pose.as_deref(), self.world_transform()),
            None => Vec::new(),
        }
    }

    fn move_to(&mut self, position: Vec3) {
        self.position = position;
        if let Some(trail) = &mut self.trail {
            trail.push(position);
        }
    }
}

struct Entry {
    generation: u32,
    slot: Option<EmitterSlot>,
}

/// 粒子桶管理器
///
/// 分配、释放并按 `SlotId` 修改发射器槽位。槽位的获取与归还只在 crate 内部
/// 可见，外部只能通过 `PfxEmitter` 的构造与 `Drop` 完成，查询接口保持公开。
///
/// ```compile_fail
/// use game_world::render::particles::{ParticleBucket, ParticleDecl};
/// use std::sync::Arc;
///
/// let mut bucket = ParticleBucket::default();
/// let _ = bucket.alloc(&Arc::new(ParticleDecl::new("FIRE")));
/// ```
pub struct ParticleBucket {
    entries: Vec<Entry>,
    free_list: Vec<u32>,
    live: usize,
    capacity: usize,
    default_trail_length: usize,
    total_allocs: u64,
    total_frees: u64,
}

impl ParticleBucket {
    /// 创建新的粒子桶
    pub fn new(config: &ParticleConfig) -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            capacity: config.max_emitters,
            default_trail_length: config.default_trail_length.max(1),
            total_allocs: 0,
            total_frees: 0,
        }
    }

    /// 创建指定容量的粒子桶
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(&ParticleConfig {
            max_emitters: capacity,
            ..ParticleConfig::default()
        })
    }

    /// 转为共享桶
    pub fn into_shared(self) -> SharedBucket {
        Arc::new(Mutex::new(self))
    }

    /// 为声明分配一个槽位
    pub(crate) fn alloc(&mut self, decl: &Arc<ParticleDecl>) -> ParticleResult<SlotId> {
        if self.live >= self.capacity {
            tracing::warn!(
                target: "particles",
                "Bucket full, cannot spawn {} ({} emitters)",
                decl.name,
                self.capacity
            );
            return Err(ParticleError::BucketFull {
                capacity: self.capacity,
            });
        }

        let slot = EmitterSlot::new(decl, self.default_trail_length);
        let index = match self.free_list.pop() {
            Some(index) => {
                self.entries[index as usize].slot = Some(slot);
                index
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    slot: Some(slot),
                });
                (self.entries.len() - 1) as u32
            }
        };

        self.live += 1;
        self.total_allocs += 1;
        let id = SlotId {
            index,
            generation: self.entries[index as usize].generation,
        };
        tracing::trace!(target: "particles", "Allocated slot {:?} for {}", id, decl.name);
        Ok(id)
    }

    /// 释放槽位
    ///
    /// 返回 `true` 表示释放了一个存活槽位；过期的 id 返回 `false`。
    pub(crate) fn free(&mut self, id: SlotId) -> bool {
        let Some(entry) = self.entries.get_mut(id.index as usize) else {
            return false;
        };
        if entry.generation != id.generation || entry.slot.is_none() {
            return false;
        }

        entry.slot = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.live -= 1;
        self.total_frees += 1;
        tracing::trace!(target: "particles", "Released slot {:?}", id);
        true
    }

    /// 获取槽位
    pub fn slot(&self, id: SlotId) -> Option<&EmitterSlot> {
        self.entries
            .get(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_ref())
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut EmitterSlot> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.slot.as_mut())
    }

    fn update(&mut self, id: SlotId, f: impl FnOnce(&mut EmitterSlot)) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                f(slot);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_position(&mut self, id: SlotId, position: Vec3) -> bool {
        self.update(id, |slot| slot.move_to(position))
    }

    pub(crate) fn set_target(&mut self, id: SlotId, target: Vec3) -> bool {
        self.update(id, |slot| slot.target = Some(target))
    }

    /// 设置朝向；矩阵中的平移部分被忽略
    pub(crate) fn set_direction(&mut self, id: SlotId, direction: Mat4) -> bool {
        self.update(id, |slot| slot.direction = strip_translation(direction))
    }

    /// 一次性设置完整世界变换（同时覆盖位置和朝向）
    pub(crate) fn set_obj_matrix(&mut self, id: SlotId, matrix: Mat4) -> bool {
        self.update(id, |slot| {
            slot.direction = strip_translation(matrix);
            slot.move_to(matrix.w_axis.truncate());
        })
    }

    /// 启用/停用发射；从停用切换到启用时特效从头播放
    pub(crate) fn set_active(&mut self, id: SlotId, active: bool) -> bool {
        self.update(id, |slot| {
            if active && !slot.active {
                slot.elapsed_ms = 0;
            }
            slot.active = active;
        })
    }

    pub(crate) fn set_looped(&mut self, id: SlotId, looped: bool) -> bool {
        self.update(id, |slot| slot.looped = looped)
    }

    pub(crate) fn set_mesh(
        &mut self,
        id: SlotId,
        mesh: Option<Arc<EmitterMesh>>,
        pose: Option<Arc<Pose>>,
    ) -> bool {
        self.update(id, |slot| {
            slot.mesh = mesh;
            slot.pose = pose;
        })
    }

    pub fn is_active(&self, id: SlotId) -> bool {
        self.slot(id).is_some_and(|slot| slot.active)
    }

    /// 推进所有启用槽位的播放时间
    ///
    /// 单次特效播放完建议时长后自动停用，循环特效从头开始。
    pub fn tick(&mut self, dt_ms: u64) {
        for entry in &mut self.entries {
            let Some(slot) = entry.slot.as_mut().filter(|slot| slot.active) else {
                continue;
            };
            slot.elapsed_ms = slot.elapsed_ms.saturating_add(dt_ms);

            let duration = slot.decl.preffered_time();
            if duration == 0 || slot.elapsed_ms < duration {
                continue;
            }
            if slot.looped {
                slot.elapsed_ms %= duration;
            } else {
                slot.elapsed_ms = duration;
                slot.active = false;
                tracing::debug!(target: "particles", "One-shot effect {} finished", slot.decl.name);
            }
        }
    }

    /// 遍历存活槽位
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &EmitterSlot)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry.slot.as_ref().map(|slot| {
                (
                    SlotId {
                        index: index as u32,
                        generation: entry.generation,
                    },
                    slot,
                )
            })
        })
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 累计分配次数
    pub fn total_allocs(&self) -> u64 {
        self.total_allocs
    }

    /// 累计释放次数
    pub fn total_frees(&self) -> u64 {
        self.total_frees
    }
}

impl Default for ParticleBucket {
    fn default() -> Self {
        Self::new(&ParticleConfig::default())
    }
}

fn strip_translation(mut matrix: Mat4) -> Mat4 {
    matrix.w_axis = glam::Vec4::W;
    matrix
}
