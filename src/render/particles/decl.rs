//! 粒子特效声明
//!
//! 声明是只读的资源数据（视觉参数、建议时长），由桶槽位引用但从不拥有。

use crate::core::error::{ParticleError, ParticleResult};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// 发射形状
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParticleShape {
    /// 点发射
    #[default]
    Point,
    /// 球形发射
    Sphere { radius: f32 },
    /// 圆锥发射
    Cone { angle: f32, radius: f32 },
    /// 盒子发射
    Box { half_extents: Vec3 },
    /// 圆形发射
    Circle { radius: f32 },
    /// 网格表面发射（需要 `set_mesh`）
    Mesh,
}

/// 拖尾声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailDecl {
    /// 保留的历史点数，None 时使用配置默认值
    #[serde(default)]
    pub length: Option<usize>,
    /// 拖尾宽度
    #[serde(default = "default_trail_width")]
    pub width: f32,
}

fn default_trail_width() -> f32 {
    1.0
}

fn default_emission_rate() -> f32 {
    100.0
}

/// 粒子特效声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleDecl {
    /// 特效名（查找时不区分大小写）
    pub name: String,
    /// 建议时长（毫秒），0 表示使用粒子寿命
    #[serde(default)]
    pub preffered_time_ms: u64,
    /// 默认是否循环
    #[serde(default)]
    pub looped: bool,
    /// 每秒发射数量
    #[serde(default = "default_emission_rate")]
    pub emission_rate: f32,
    /// 单个粒子寿命（毫秒）
    #[serde(default)]
    pub lifetime_ms: u64,
    /// 发射形状
    #[serde(default)]
    pub shape: ParticleShape,
    /// 拖尾
    #[serde(default)]
    pub trail: Option<TrailDecl>,
    /// 贴图 / 视觉资源名
    #[serde(default)]
    pub visual: Option<String>,
}

impl ParticleDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preffered_time_ms: 0,
            looped: false,
            emission_rate: default_emission_rate(),
            lifetime_ms: 0,
            shape: ParticleShape::Point,
            trail: None,
            visual: None,
        }
    }

    /// 设置建议时长
    pub fn with_preffered_time(mut self, ms: u64) -> Self {
        self.preffered_time_ms = ms;
        self
    }

    /// 设置粒子寿命
    pub fn with_lifetime(mut self, ms: u64) -> Self {
        self.lifetime_ms = ms;
        self
    }

    /// 设置默认循环
    pub fn with_looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    /// 设置拖尾
    pub fn with_trail(mut self, trail: TrailDecl) -> Self {
        self.trail = Some(trail);
        self
    }

    /// 设置发射形状
    pub fn with_shape(mut self, shape: ParticleShape) -> Self {
        self.shape = shape;
        self
    }

    /// 特效的自然时长（毫秒）
    ///
    /// 声明未给出建议时长时退化为粒子寿命。
    pub fn preffered_time(&self) -> u64 {
        if self.preffered_time_ms > 0 {
            self.preffered_time_ms
        } else {
            self.lifetime_ms
        }
    }

    /// 校验声明
    pub fn validate(&self) -> ParticleResult<()> {
        if self.name.trim().is_empty() {
            return Err(ParticleError::InvalidDecl {
                name: self.name.clone(),
                reason: "empty name".to_string(),
            });
        }
        if !self.emission_rate.is_finite() || self.emission_rate < 0.0 {
            return Err(ParticleError::InvalidDecl {
                name: self.name.clone(),
                reason: format!("bad emission rate {}", self.emission_rate),
            });
        }
        if let Some(trail) = &self.trail {
            if trail.length == Some(0) || !trail.width.is_finite() || trail.width <= 0.0 {
                return Err(ParticleError::InvalidDecl {
                    name: self.name.clone(),
                    reason: "bad trail parameters".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// 规范化特效名：去掉首尾空白和 `.PFX` 扩展名，转为大写
pub fn normalize_name(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase();
    match upper.strip_suffix(".PFX") {
        Some(stem) => stem.to_string(),
        None => upper,
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DeclFile {
    #[serde(rename = "effect", default)]
    effects: Vec<ParticleDecl>,
}

/// 粒子声明注册表
#[derive(Debug, Default, Clone)]
pub struct ParticleDeclRegistry {
    decls: HashMap<String, Arc<ParticleDecl>>,
}

impl ParticleDeclRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册声明；同名声明会被替换
    pub fn insert(&mut self, decl: ParticleDecl) -> ParticleResult<Arc<ParticleDecl>> {
        decl.validate()?;
        let key = normalize_name(&decl.name);
        let decl = Arc::new(decl);
        if self.decls.insert(key, Arc::clone(&decl)).is_some() {
            tracing::warn!(target: "particles", "Particle declaration {} replaced", decl.name);
        }
        Ok(decl)
    }

    /// 按名称查找（不区分大小写，忽略 `.PFX`）
    pub fn get(&self, name: &str) -> Option<Arc<ParticleDecl>> {
        self.decls.get(&normalize_name(name)).cloned()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// 从TOML字符串加载（`[[effect]]` 表）
    pub fn from_toml_str(content: &str) -> ParticleResult<Self> {
        let file: DeclFile =
            toml::from_str(content).map_err(|e| ParticleError::Parse(e.to_string()))?;
        Self::from_decls(file.effects)
    }

    /// 从JSON字符串加载（`{"effect": [...]}`）
    pub fn from_json_str(content: &str) -> ParticleResult<Self> {
        let file: DeclFile =
            serde_json::from_str(content).map_err(|e| ParticleError::Parse(e.to_string()))?;
        Self::from_decls(file.effects)
    }

    /// 从文件加载，按扩展名选择格式
    pub fn from_file<P: AsRef<Path>>(path: P) -> ParticleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ParticleError::Parse(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    fn from_decls(decls: Vec<ParticleDecl>) -> ParticleResult<Self> {
        let mut registry = Self::new();
        for decl in decls {
            registry.insert(decl)?;
        }
        tracing::debug!(target: "particles", "Loaded {} particle declarations", registry.len());
        Ok(registry)
    }
}
