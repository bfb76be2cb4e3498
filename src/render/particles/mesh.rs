//! 网格表面发射
//!
//! 发射器可以挂载一个蒙皮网格和动画姿态，粒子从姿态变形后的网格表面发出。

use glam::{Mat4, Vec3};

/// 蒙皮顶点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinnedVertex {
    /// 绑定姿态下的局部位置
    pub position: Vec3,
    /// 驱动该顶点的骨骼索引
    pub bone: usize,
}

/// 用于发射的蒙皮网格
#[derive(Debug, Clone, Default)]
pub struct EmitterMesh {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
}

impl EmitterMesh {
    pub fn new(name: impl Into<String>, vertices: Vec<SkinnedVertex>) -> Self {
        Self {
            name: name.into(),
            vertices,
        }
    }

    /// 计算世界空间下的表面发射点
    ///
    /// 骨骼索引越界或没有姿态时，顶点按绑定姿态处理。
    pub fn surface_points(&self, pose: Option<&Pose>, world: Mat4) -> Vec<Vec3> {
        self.vertices
            .iter()
            .map(|v| {
                let bone = pose.map_or(Mat4::IDENTITY, |p| p.bone(v.bone));
                world.transform_point3(bone.transform_point3(v.position))
            })
            .collect()
    }
}

/// 动画姿态：每根骨骼的模型空间矩阵
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub bones: Vec<Mat4>,
}

impl Pose {
    pub fn new(bones: Vec<Mat4>) -> Self {
        Self { bones }
    }

    /// 骨骼矩阵，越界时返回单位矩阵
    pub fn bone(&self, index: usize) -> Mat4 {
        self.bones.get(index).copied().unwrap_or(Mat4::IDENTITY)
    }
}
