//! # 介电张量与 Born 有效电荷
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs`, `phonon/born.rs`, `phonon/reduce.rs` 使用

use crate::error::{PhonomatError, Result};
use crate::models::mat3::Mat3;

/// 介电张量（物理上对称，但不强制）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DielectricTensor(pub Mat3);

impl DielectricTensor {
    pub fn matrix(&self) -> &Mat3 {
        &self.0
    }
}

/// Born 有效电荷：每个原子一个 3x3 张量
#[derive(Debug, Clone, PartialEq)]
pub struct BornChargeSet {
    charges: Vec<Mat3>,
}

impl BornChargeSet {
    /// 创建时检查张量数与原子数一致
    pub fn new(charges: Vec<Mat3>, num_atoms: usize) -> Result<Self> {
        if charges.len() != num_atoms {
            return Err(PhonomatError::SiteCountMismatch {
                borns: charges.len(),
                atoms: num_atoms,
            });
        }
        Ok(BornChargeSet { charges })
    }

    pub fn charges(&self) -> &[Mat3] {
        &self.charges
    }

    pub fn len(&self) -> usize {
        self.charges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mat3::IDENTITY;

    #[test]
    fn test_born_count_must_match_atoms() {
        let err = BornChargeSet::new(vec![IDENTITY; 2], 3).unwrap_err();
        assert!(matches!(
            err,
            PhonomatError::SiteCountMismatch { borns: 2, atoms: 3 }
        ));
        assert_eq!(BornChargeSet::new(vec![IDENTITY; 3], 3).unwrap().len(), 3);
    }
}
