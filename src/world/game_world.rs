//! 游戏世界
//!
//! 持有粒子声明、粒子桶和当前关卡的触发器，接收触发器发出的关卡切换请求。
//! 世界只记录请求，真正的关卡切换由外层驱动循环完成。

use crate::config::WorldConfig;
use crate::core::error::LevelResult;
use crate::render::particles::bucket::{lock_bucket, ParticleBucket, SharedBucket};
use crate::render::particles::decl::{ParticleDecl, ParticleDeclRegistry};
use crate::render::particles::emitter::PfxEmitter;
use crate::world::trigger::{ChangeWorld, Intersector, Trigger};
use crate::world::vob::{LevelData, VobKind};
use bevy_ecs::prelude::*;
use std::sync::Arc;

/// 关卡切换请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeWorldRequest {
    pub level_name: String,
    pub start_vob_name: String,
}

/// 触发器产生的待处理请求
#[derive(Debug, Default)]
struct PendingRequests {
    changes: Vec<ChangeWorldRequest>,
    events: Vec<String>,
}

impl ChangeWorld for PendingRequests {
    fn trigger_change_world(&mut self, level_name: &str, start_vob_name: &str) {
        tracing::info!(
            target: "world",
            "Change world requested: {} (start {})",
            level_name,
            start_vob_name
        );
        self.changes.push(ChangeWorldRequest {
            level_name: level_name.to_string(),
            start_vob_name: start_vob_name.to_string(),
        });
    }

    fn emit_event(&mut self, target: &str) {
        tracing::debug!(target: "world", "Trigger event sent to {}", target);
        self.events.push(target.to_string());
    }
}

/// 游戏世界
#[derive(Resource)]
pub struct GameWorld {
    config: WorldConfig,
    level_name: Option<String>,
    // 发射器先于桶释放
    emitters: Vec<PfxEmitter>,
    triggers: Vec<Trigger>,
    requests: PendingRequests,
    registry: ParticleDeclRegistry,
    bucket: SharedBucket,
}

impl GameWorld {
    /// 创建新的游戏世界
    pub fn new(config: WorldConfig, registry: ParticleDeclRegistry) -> Self {
        let bucket = ParticleBucket::new(&config.particles).into_shared();
        Self {
            config,
            level_name: None,
            emitters: Vec::new(),
            triggers: Vec::new(),
            requests: PendingRequests::default(),
            registry,
            bucket,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &ParticleDeclRegistry {
        &self.registry
    }

    /// 粒子桶管理器
    pub fn bucket(&self) -> &SharedBucket {
        &self.bucket
    }

    /// 按名称查找粒子声明
    pub fn find_particle_decl(&self, name: &str) -> Option<Arc<ParticleDecl>> {
        self.registry.get(name)
    }

    /// 当前关卡名
    pub fn level_name(&self) -> Option<&str> {
        self.level_name.as_deref()
    }

    /// 加载关卡
    ///
    /// 旧关卡的发射器和触发器先被销毁，其槽位归还给桶。
    /// 无法解析特效名的粒子 VOB 得到空发射器。
    pub fn load_level(&mut self, level: &LevelData) -> LevelResult<()> {
        level.validate()?;

        self.emitters.clear();
        self.triggers.clear();

        let mut emitters = Vec::new();
        let mut triggers = Vec::new();
        for vob in &level.vobs {
            if let VobKind::Pfx { .. } = vob.kind {
                emitters.push(PfxEmitter::from_vob(self, vob));
            } else if let Some(trigger) = Trigger::from_vob(vob) {
                triggers.push(trigger?);
            }
        }

        tracing::info!(
            target: "world",
            "Loaded level {}: {} emitters, {} triggers",
            level.name,
            emitters.len(),
            triggers.len()
        );
        self.emitters = emitters;
        self.triggers = triggers;
        self.level_name = Some(level.name.clone());
        Ok(())
    }

    pub fn emitters(&self) -> &[PfxEmitter] {
        &self.emitters
    }

    pub fn emitters_mut(&mut self) -> &mut [PfxEmitter] {
        &mut self.emitters
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// 对包含实体位置的所有触发器调用相交回调
    ///
    /// 返回被触碰的触发器数量。
    pub fn check_zones(&mut self, entity: &dyn Intersector) -> usize {
        let position = entity.position();
        let mut touched = 0;
        for trigger in &mut self.triggers {
            if trigger.base().contains(position) {
                trigger.on_intersect(&mut self.requests, entity);
                touched += 1;
            }
        }
        touched
    }

    /// 推进粒子播放时间
    pub fn tick(&mut self, dt_ms: u64) {
        lock_bucket(&self.bucket).tick(dt_ms);
    }

    /// 待处理的关卡切换请求
    pub fn pending_changes(&self) -> &[ChangeWorldRequest] {
        &self.requests.changes
    }

    /// 取出最新的关卡切换请求并清空队列
    pub fn take_change_request(&mut self) -> Option<ChangeWorldRequest> {
        let latest = self.requests.changes.pop();
        self.requests.changes.clear();
        latest
    }

    /// 取出触发事件
    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests.events)
    }
}

impl ChangeWorld for GameWorld {
    fn trigger_change_world(&mut self, level_name: &str, start_vob_name: &str) {
        self.requests.trigger_change_world(level_name, start_vob_name);
    }

    fn emit_event(&mut self, target: &str) {
        self.requests.emit_event(target);
    }
}
