//! 世界触发器
//!
//! 触发器在实体进入触发体积时被碰撞系统回调。每种触发器只实现一个
//! 相交处理操作，通过 `Trigger` 枚举分发。冷却/重复触发逻辑不在此处。

use crate::core::error::{LevelError, LevelResult};
use crate::world::vob::{VobDescriptor, VobKind};
use glam::Vec3;

/// 触发器向世界发出的请求
pub trait ChangeWorld {
    /// 请求切换到另一个关卡，并在 `start_vob_name` 处出生
    ///
    /// 世界负责校验名字和处理失败，调用方不关心结果。
    fn trigger_change_world(&mut self, level_name: &str, start_vob_name: &str);

    /// 向名为 `target` 的对象发送触发事件
    fn emit_event(&mut self, _target: &str) {}
}

/// 可以与触发体积相交的实体
pub trait Intersector {
    /// 是否为玩家控制的实体
    fn is_player(&self) -> bool;

    fn position(&self) -> Vec3;
}

/// 所有触发器共有的状态
#[derive(Debug, Clone)]
pub struct TriggerBase {
    vob: VobDescriptor,
    fire_count: u32,
}

impl TriggerBase {
    pub fn new(vob: VobDescriptor) -> Self {
        Self { vob, fire_count: 0 }
    }

    pub fn vob(&self) -> &VobDescriptor {
        &self.vob
    }

    pub fn name(&self) -> &str {
        &self.vob.name
    }

    /// 父对象索引
    pub fn parent(&self) -> Option<u32> {
        self.vob.parent
    }

    pub fn is_startup(&self) -> bool {
        self.vob.startup
    }

    /// 已触发次数
    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    /// 实体位置是否在触发体积内；没有包围盒的触发器永不相交
    pub fn contains(&self, point: Vec3) -> bool {
        self.vob.bbox.is_some_and(|bbox| bbox.contains(point))
    }

    fn record_fire(&mut self) {
        self.fire_count = self.fire_count.saturating_add(1);
    }
}

/// 关卡切换触发区
#[derive(Debug, Clone)]
pub struct ZoneTrigger {
    base: TriggerBase,
    level_name: String,
    start_vob_name: String,
}

impl ZoneTrigger {
    /// 从 `ChangeLevel` 类型的 VOB 创建
    pub fn from_vob(vob: VobDescriptor) -> LevelResult<Self> {
        vob.validate()?;
        let VobKind::ChangeLevel {
            level_name,
            start_vob_name,
        } = &vob.kind
        else {
            return Err(LevelError::MissingPayload {
                vob: vob.name.clone(),
                field: "changeLevel",
            });
        };
        Ok(Self {
            level_name: level_name.clone(),
            start_vob_name: start_vob_name.clone(),
            base: TriggerBase::new(vob),
        })
    }

    pub fn base(&self) -> &TriggerBase {
        &self.base
    }

    /// 目标关卡名
    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// 目标关卡中的出生点
    pub fn start_vob_name(&self) -> &str {
        &self.start_vob_name
    }

    /// 实体进入触发区
    ///
    /// 只有玩家会请求切换关卡，其他实体被静默忽略。
    pub fn on_intersect(&mut self, world: &mut dyn ChangeWorld, entity: &dyn Intersector) {
        if !entity.is_player() {
            return;
        }
        self.base.record_fire();
        tracing::info!(
            target: "trigger",
            "Zone {} sends player to {} at {}",
            self.base.name(),
            self.level_name,
            self.start_vob_name
        );
        world.trigger_change_world(&self.level_name, &self.start_vob_name);
    }
}

/// 普通触发器：任何实体进入都会向目标发送事件
#[derive(Debug, Clone)]
pub struct BasicTrigger {
    base: TriggerBase,
    target: String,
}

impl BasicTrigger {
    pub fn from_vob(vob: VobDescriptor) -> LevelResult<Self> {
        let VobKind::Trigger { target } = &vob.kind else {
            return Err(LevelError::MissingPayload {
                vob: vob.name.clone(),
                field: "target",
            });
        };
        Ok(Self {
            target: target.clone(),
            base: TriggerBase::new(vob),
        })
    }

    pub fn base(&self) -> &TriggerBase {
        &self.base
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn on_intersect(&mut self, world: &mut dyn ChangeWorld, _entity: &dyn Intersector) {
        self.base.record_fire();
        if !self.target.is_empty() {
            world.emit_event(&self.target);
        }
    }
}

/// 触发器类型
#[derive(Debug, Clone)]
pub enum Trigger {
    ChangeLevel(ZoneTrigger),
    Basic(BasicTrigger),
}

impl Trigger {
    /// 按 VOB 类型创建触发器；非触发器 VOB 返回 `None`
    pub fn from_vob(vob: &VobDescriptor) -> Option<LevelResult<Self>> {
        match vob.kind {
            VobKind::ChangeLevel { .. } => {
                Some(ZoneTrigger::from_vob(vob.clone()).map(Self::ChangeLevel))
            }
            VobKind::Trigger { .. } => Some(BasicTrigger::from_vob(vob.clone()).map(Self::Basic)),
            VobKind::Pfx { .. } | VobKind::Other => None,
        }
    }

    pub fn base(&self) -> &TriggerBase {
        match self {
            Self::ChangeLevel(trigger) => trigger.base(),
            Self::Basic(trigger) => trigger.base(),
        }
    }

    pub fn on_intersect(&mut self, world: &mut dyn ChangeWorld, entity: &dyn Intersector) {
        match self {
            Self::ChangeLevel(trigger) => trigger.on_intersect(world, entity),
            Self::Basic(trigger) => trigger.on_intersect(world, entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingWorld {
        changes: Vec<(String, String)>,
        events: Vec<String>,
    }

    impl ChangeWorld for RecordingWorld {
        fn trigger_change_world(&mut self, level_name: &str, start_vob_name: &str) {
            self.changes
                .push((level_name.to_string(), start_vob_name.to_string()));
        }

        fn emit_event(&mut self, target: &str) {
            self.events.push(target.to_string());
        }
    }

    struct TestEntity {
        player: bool,
    }

    impl Intersector for TestEntity {
        fn is_player(&self) -> bool {
            self.player
        }

        fn position(&self) -> Vec3 {
            Vec3::ZERO
        }
    }

    fn zone() -> ZoneTrigger {
        ZoneTrigger::from_vob(VobDescriptor::new(
            "ZONE_NEWWORLD",
            VobKind::ChangeLevel {
                level_name: "NEWWORLD.ZEN".to_string(),
                start_vob_name: "START".to_string(),
            },
        ))
        .unwrap()
    }

    #[test]
    fn test_player_requests_level_change_once() {
        let mut world = RecordingWorld::default();
        let mut trigger = zone();

        trigger.on_intersect(&mut world, &TestEntity { player: true });

        assert_eq!(
            world.changes,
            vec![("NEWWORLD.ZEN".to_string(), "START".to_string())]
        );
        assert_eq!(trigger.base().fire_count(), 1);
    }

    #[test]
    fn test_non_player_is_ignored() {
        let mut world = RecordingWorld::default();
        let mut trigger = zone();

        trigger.on_intersect(&mut world, &TestEntity { player: false });

        assert!(world.changes.is_empty());
        assert!(world.events.is_empty());
        assert_eq!(trigger.base().fire_count(), 0);
    }

    #[test]
    fn test_payload_is_untouched_by_firing() {
        let mut world = RecordingWorld::default();
        let mut trigger = zone();
        for _ in 0..3 {
            trigger.on_intersect(&mut world, &TestEntity { player: true });
        }
        assert_eq!(trigger.level_name(), "NEWWORLD.ZEN");
        assert_eq!(trigger.start_vob_name(), "START");
        assert_eq!(world.changes.len(), 3);
    }

    #[test]
    fn test_wrong_vob_kind_rejected() {
        let vob = VobDescriptor::new("LAMP", VobKind::Other);
        assert!(ZoneTrigger::from_vob(vob.clone()).is_err());
        assert!(Trigger::from_vob(&vob).is_none());
    }

    #[test]
    fn test_basic_trigger_fires_for_any_entity() {
        let mut world = RecordingWorld::default();
        let vob = VobDescriptor::new(
            "GATE_TRIGGER",
            VobKind::Trigger {
                target: "CASTLE_GATE".to_string(),
            },
        );
        let mut trigger = Trigger::from_vob(&vob).unwrap().unwrap();

        trigger.on_intersect(&mut world, &TestEntity { player: false });
        assert_eq!(world.events, vec!["CASTLE_GATE".to_string()]);
        assert!(world.changes.is_empty());
    }

    #[test]
    fn test_dispatch_through_enum() {
        let mut world = RecordingWorld::default();
        let mut trigger = Trigger::ChangeLevel(zone());
        trigger.on_intersect(&mut world, &TestEntity { player: true });
        assert_eq!(world.changes.len(), 1);
        assert_eq!(trigger.base().name(), "ZONE_NEWWORLD");
    }
}
