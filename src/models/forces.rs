//! # 原子受力数据模型
//!
//! 每个位移构型对应一个 [`ForceSet`]（num_atoms × 3）。
//! 漂移力（所有原子的平均受力）只报告，从不自动扣除。
//!
//! ## 依赖关系
//! - 被 `parsers/force_file.rs`, `commands/forces.rs` 使用

use crate::models::mat3::Vec3;

/// 单个构型的原子受力
#[derive(Debug, Clone, PartialEq)]
pub struct ForceSet {
    forces: Vec<Vec3>,
}

impl ForceSet {
    pub fn new(forces: Vec<Vec3>) -> Self {
        ForceSet { forces }
    }

    pub fn forces(&self) -> &[Vec3] {
        &self.forces
    }

    pub fn num_atoms(&self) -> usize {
        self.forces.len()
    }

    /// 漂移力
    pub fn drift(&self) -> Vec3 {
        get_drift_forces(&self.forces)
    }
}

/// 计算漂移力：所有原子受力的平均值
pub fn get_drift_forces(forces: &[Vec3]) -> Vec3 {
    if forces.is_empty() {
        return [0.0; 3];
    }

    let mut sum = [0.0; 3];
    for f in forces {
        for k in 0..3 {
            sum[k] += f[k];
        }
    }
    let n = forces.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}
