use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 粒子桶配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// 桶内最大发射器槽位数
    pub max_emitters: usize,

    /// 拖尾默认保留的历史点数（声明未指定时使用）
    pub default_trail_length: usize,
}

impl_default!(ParticleConfig {
    max_emitters: 1024,
    default_trail_length: 16,
});

impl ParticleConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_emitters == 0 || self.max_emitters > u32::MAX as usize {
            return Err(ConfigError::ValidationError(
                "Invalid max emitter count".to_string(),
            ));
        }
        if self.default_trail_length == 0 {
            return Err(ConfigError::ValidationError(
                "Trail length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
