//! 统一错误处理模块
//!
//! 提供世界运行时范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **粒子错误** (`ParticleError`): 粒子声明解析、桶槽位分配
//! - **关卡错误** (`LevelError`): VOB / 关卡数据解析
//! - **配置错误** (`config::ConfigError`): 配置文件读取与校验
//!
//! `WorldError` 汇总以上所有错误。
//!
//! 注意：游戏热路径（发射器修改器、触发器回调）从不返回错误，
//! 失败时静默降级为空句柄或空操作。只有加载器和 `try_*` 构造函数返回 `Result`。

use crate::config::ConfigError;
use thiserror::Error;

/// 世界运行时顶层错误类型
#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Particle error: {0}")]
    Particle(#[from] ParticleError),

    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 粒子系统错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParticleError {
    #[error("Unknown particle effect: {0}")]
    UnknownEffect(String),

    #[error("Particle bucket is full ({capacity} emitters)")]
    BucketFull { capacity: usize },

    #[error("Invalid particle declaration {name}: {reason}")]
    InvalidDecl { name: String, reason: String },

    #[error("Vob {0} is not a particle effect")]
    NotAnEmitterVob(String),

    #[error("Failed to parse particle declarations: {0}")]
    Parse(String),
}

/// 关卡数据错误
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("Failed to parse level data: {0}")]
    Parse(String),

    #[error("Vob {vob} is missing its {field} payload")]
    MissingPayload { vob: String, field: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 世界结果类型别名
pub type WorldResult<T> = Result<T, WorldError>;
pub type ParticleResult<T> = Result<T, ParticleError>;
pub type LevelResult<T> = Result<T, LevelError>;
