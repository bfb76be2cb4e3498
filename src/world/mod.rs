//! 世界管理
//!
//! 关卡数据、触发器以及持有粒子桶的游戏世界。

pub mod game_world;
pub mod trigger;
pub mod vob;

pub use game_world::{ChangeWorldRequest, GameWorld};
pub use trigger::{BasicTrigger, ChangeWorld, Intersector, Trigger, TriggerBase, ZoneTrigger};
pub use vob::{BoundingBox, LevelData, VobDescriptor, VobKind};
