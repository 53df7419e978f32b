//! # 3x3 矩阵工具
//!
//! 晶格、旋转操作与二阶张量共用的小型线性代数函数。
//! 矩阵按行存储：`m[row][col]`。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs`, `phonon/born.rs` 使用
//! - 无外部模块依赖

pub type Mat3 = [[f64; 3]; 3];
pub type Vec3 = [f64; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
pub const ZERO: Mat3 = [[0.0; 3]; 3];

pub fn determinant(m: &Mat3) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]) - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// 求逆；奇异矩阵返回 `None`
pub fn inverse(m: &Mat3) -> Option<Mat3> {
    let det = determinant(m);
    if det.abs() < 1e-12 {
        return None;
    }

    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ])
}

pub fn transpose(m: &Mat3) -> Mat3 {
    let mut t = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            t[i][j] = m[j][i];
        }
    }
    t
}

pub fn mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut c = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            c[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    c
}

pub fn mul_vec(m: &Mat3, v: &Vec3) -> Vec3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// 行向量左乘：`v · m`
pub fn vec_mul(v: &Vec3, m: &Mat3) -> Vec3 {
    [
        v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
        v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
        v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
    ]
}

pub fn add_assign(acc: &mut Mat3, m: &Mat3) {
    for i in 0..3 {
        for j in 0..3 {
            acc[i][j] += m[i][j];
        }
    }
}

pub fn scale(m: &Mat3, factor: f64) -> Mat3 {
    let mut s = *m;
    for row in s.iter_mut() {
        for x in row.iter_mut() {
            *x *= factor;
        }
    }
    s
}

/// 相似变换 `a · m · a⁻¹`
pub fn similarity(a: &Mat3, m: &Mat3) -> Option<Mat3> {
    let inv = inverse(a)?;
    Some(mul(&mul(a, m), &inv))
}

pub fn max_abs_diff(a: &Mat3, b: &Mat3) -> f64 {
    let mut max = 0.0_f64;
    for i in 0..3 {
        for j in 0..3 {
            max = max.max((a[i][j] - b[i][j]).abs());
        }
    }
    max
}

pub fn from_int(r: &[[i32; 3]; 3]) -> Mat3 {
    let mut m = ZERO;
    for i in 0..3 {
        for j in 0..3 {
            m[i][j] = r[i][j] as f64;
        }
    }
    m
}

pub fn norm(v: &Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_round_trip() {
        let m = [[4.0, 0.0, 0.0], [2.0, 3.5, 0.0], [0.3, 0.1, 6.0]];
        let inv = inverse(&m).unwrap();
        let id = mul(&m, &inv);
        assert!(max_abs_diff(&id, &IDENTITY) < 1e-12);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]];
        assert!(inverse(&m).is_none());
    }

    #[test]
    fn test_vec_mul_is_row_times_matrix() {
        let m = [[1.0, 2.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 3.0]];
        assert_eq!(vec_mul(&[1.0, 1.0, 1.0], &m), [1.0, 3.0, 3.0]);
        assert_eq!(mul_vec(&m, &[1.0, 1.0, 1.0]), [3.0, 1.0, 3.0]);
    }
}
