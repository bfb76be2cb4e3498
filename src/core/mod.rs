//! 核心模块
//!
//! 包含运行时的公共基础：
//! - `error` - 错误类型定义
//! - `macros` - 辅助宏

pub mod error;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    LevelError, LevelResult, ParticleError, ParticleResult, WorldError, WorldResult,
};
