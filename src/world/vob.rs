//! 关卡中放置的世界对象（VOB）描述
//!
//! 描述来自关卡数据，加载后只读。

use crate::core::error::{LevelError, LevelResult};
use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max).to_array(),
            max: min.max(max).to_array(),
        }
    }

    /// 点是否在盒内（含边界）
    pub fn contains(&self, point: Vec3) -> bool {
        let min = Vec3::from_array(self.min);
        let max = Vec3::from_array(self.max);
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

/// VOB 类型及其载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VobKind {
    /// 放置的粒子特效
    Pfx { visual: String },
    /// 切换关卡的触发区
    ChangeLevel {
        level_name: String,
        start_vob_name: String,
    },
    /// 普通触发器，触发时向目标发送事件
    Trigger {
        #[serde(default)]
        target: String,
    },
    /// 其他装饰物
    Other,
}

fn identity_rotation() -> [f32; 9] {
    [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
}

/// VOB 描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VobDescriptor {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// 行主序 3×3 旋转矩阵
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 9],
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    /// 父 VOB 索引
    #[serde(default)]
    pub parent: Option<u32>,
    /// 关卡加载时即触发
    #[serde(default)]
    pub startup: bool,
    pub kind: VobKind,
}

impl VobDescriptor {
    pub fn new(name: impl Into<String>, kind: VobKind) -> Self {
        Self {
            name: name.into(),
            position: [0.0; 3],
            rotation: identity_rotation(),
            bbox: None,
            parent: None,
            startup: false,
            kind,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position.to_array();
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// 世界变换
    pub fn transform(&self) -> Mat4 {
        // 行主序存储，glam 按列构造，需要转置
        let rotation = Mat3::from_cols_array(&self.rotation).transpose();
        Mat4::from_translation(self.position()) * Mat4::from_mat3(rotation)
    }

    /// 检查载荷是否完整
    pub fn validate(&self) -> LevelResult<()> {
        let missing = match &self.kind {
            VobKind::Pfx { visual } if visual.trim().is_empty() => Some("visual"),
            VobKind::ChangeLevel { level_name, .. } if level_name.trim().is_empty() => {
                Some("levelName")
            }
            _ => None,
        };
        match missing {
            Some(field) => Err(LevelError::MissingPayload {
                vob: self.name.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// 关卡数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    #[serde(default)]
    pub vobs: Vec<VobDescriptor>,
}

impl LevelData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vobs: Vec::new(),
        }
    }

    /// 从JSON字符串解析
    pub fn from_json_str(content: &str) -> LevelResult<Self> {
        serde_json::from_str(content).map_err(|e| LevelError::Parse(e.to_string()))
    }

    /// 从TOML字符串解析（`[[vobs]]` 表）
    pub fn from_toml_str(content: &str) -> LevelResult<Self> {
        toml::from_str(content).map_err(|e| LevelError::Parse(e.to_string()))
    }

    /// 从文件加载，按扩展名选择格式
    pub fn from_file<P: AsRef<Path>>(path: P) -> LevelResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// 检查所有 VOB
    pub fn validate(&self) -> LevelResult<()> {
        self.vobs.iter().try_for_each(VobDescriptor::validate)
    }

    /// 保存为JSON文件
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> LevelResult<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| LevelError::Parse(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_JSON: &str = r#"{
        "name": "OLDWORLD.ZEN",
        "vobs": [
            {
                "name": "ZONE_NEWWORLD",
                "position": [10.0, 0.0, 5.0],
                "bbox": {"min": [0.0, -1.0, 0.0], "max": [20.0, 5.0, 10.0]},
                "kind": {"type": "ChangeLevel", "level_name": "NEWWORLD.ZEN", "start_vob_name": "START"}
            },
            {
                "name": "CAMPFIRE",
                "position": [1.0, 2.0, 3.0],
                "kind": {"type": "Pfx", "visual": "FIRE.PFX"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_level_json() {
        let level = LevelData::from_json_str(LEVEL_JSON).unwrap();
        assert_eq!(level.name, "OLDWORLD.ZEN");
        assert_eq!(level.vobs.len(), 2);
        assert_eq!(
            level.vobs[0].kind,
            VobKind::ChangeLevel {
                level_name: "NEWWORLD.ZEN".to_string(),
                start_vob_name: "START".to_string(),
            }
        );
        assert_eq!(level.vobs[1].rotation, identity_rotation());
        assert!(level.validate().is_ok());
    }

    #[test]
    fn test_parse_level_toml() {
        let level = LevelData::from_toml_str(
            r#"
            name = "TOWN.ZEN"

            [[vobs]]
            name = "SMOKE_01"
            position = [0.0, 1.0, 0.0]
            kind = { type = "Pfx", visual = "SMOKE" }
            "#,
        )
        .unwrap();
        assert_eq!(level.vobs[0].position(), Vec3::Y);
    }

    #[test]
    fn test_transform_combines_rotation_and_position() {
        let mut vob = VobDescriptor::new("ROTATED", VobKind::Other)
            .with_position(Vec3::new(1.0, 2.0, 3.0));
        // 绕 Y 轴 90 度，行主序
        vob.rotation = [0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0];

        let m = vob.transform();
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(m.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_bbox_contains() {
        let bbox = BoundingBox::new(Vec3::new(5.0, 5.0, 5.0), Vec3::ZERO);
        assert!(bbox.contains(Vec3::splat(2.5)));
        assert!(bbox.contains(Vec3::ZERO));
        assert!(!bbox.contains(Vec3::new(6.0, 1.0, 1.0)));
    }

    #[test]
    fn test_missing_payload_detected() {
        let vob = VobDescriptor::new(
            "BROKEN_ZONE",
            VobKind::ChangeLevel {
                level_name: String::new(),
                start_vob_name: "START".to_string(),
            },
        );
        assert!(matches!(
            vob.validate(),
            Err(LevelError::MissingPayload { field: "levelName", .. })
        ));
    }

    #[test]
    fn test_file_io() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        let level = LevelData::from_json_str(LEVEL_JSON).unwrap();
        level.save_json(&path).unwrap();

        let loaded = LevelData::from_file(&path).unwrap();
        assert_eq!(loaded, level);
    }
}
