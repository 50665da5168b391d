//! # 近邻表
//!
//! 枚举截断半径内的原子对。自由边界用直接双循环；周期体系
//! 采用最小镜像约定，要求截断半径小于最短晶胞边长的一半。
//!
//! ## 依赖关系
//! - 被 `potential/descriptor.rs`, `potential/calculator.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{PotkitError, Result};
use crate::models::Structure;

/// 一个近邻原子对 (i < j)
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub i: usize,
    pub j: usize,
    /// 原子间距 (Å)
    pub distance: f64,
    /// i 指向 j 镜像的单位向量
    pub unit: [f64; 3],
}

/// 截断半径内的原子对集合
#[derive(Debug, Clone)]
pub struct NeighborList {
    pub pairs: Vec<Neighbor>,
}

impl NeighborList {
    /// 构建近邻表
    pub fn build(structure: &Structure, cutoff: f64) -> Result<Self> {
        let periodic = structure.pbc.iter().any(|&p| p) && structure.cell.is_some();

        if periodic {
            Self::build_periodic(structure, cutoff)
        } else {
            Ok(Self::build_free(structure, cutoff))
        }
    }

    fn build_free(structure: &Structure, cutoff: f64) -> Self {
        let n = structure.len();
        let mut pairs = Vec::new();

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = [
                    structure.positions[j][0] - structure.positions[i][0],
                    structure.positions[j][1] - structure.positions[i][1],
                    structure.positions[j][2] - structure.positions[i][2],
                ];
                push_if_within(&mut pairs, i, j, delta, cutoff);
            }
        }

        NeighborList { pairs }
    }

    fn build_periodic(structure: &Structure, cutoff: f64) -> Result<Self> {
        let cell = structure.cell.as_ref().unwrap();
        let (a, b, c) = cell.lengths();
        let limit = 0.5 * a.min(b).min(c);
        if cutoff >= limit {
            return Err(PotkitError::CutoffTooLarge { cutoff, limit });
        }

        let inverse = invert_3x3(&cell.matrix).ok_or_else(|| {
            PotkitError::Other("singular cell matrix in neighbor list".to_string())
        })?;

        let n = structure.len();
        let mut pairs = Vec::new();

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = [
                    structure.positions[j][0] - structure.positions[i][0],
                    structure.positions[j][1] - structure.positions[i][1],
                    structure.positions[j][2] - structure.positions[i][2],
                ];

                // 转分数坐标，按周期方向取最近镜像
                let mut frac = cart_to_frac(delta, &inverse);
                for axis in 0..3 {
                    if structure.pbc[axis] {
                        frac[axis] -= frac[axis].round();
                    }
                }
                let wrapped = frac_to_cart(frac, &cell.matrix);

                push_if_within(&mut pairs, i, j, wrapped, cutoff);
            }
        }

        Ok(NeighborList { pairs })
    }
}

fn push_if_within(pairs: &mut Vec<Neighbor>, i: usize, j: usize, delta: [f64; 3], cutoff: f64) {
    let distance =
        (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();
    if distance < cutoff && distance > 1e-12 {
        pairs.push(Neighbor {
            i,
            j,
            distance,
            unit: [
                delta[0] / distance,
                delta[1] / distance,
                delta[2] / distance,
            ],
        });
    }
}

/// 3x3 矩阵求逆；奇异时返回 None
fn invert_3x3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

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

/// 行向量约定：frac = cart · M⁻¹
fn cart_to_frac(cart: [f64; 3], inverse: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        cart[0] * inverse[0][0] + cart[1] * inverse[1][0] + cart[2] * inverse[2][0],
        cart[0] * inverse[0][1] + cart[1] * inverse[1][1] + cart[2] * inverse[2][1],
        cart[0] * inverse[0][2] + cart[1] * inverse[1][2] + cart[2] * inverse[2][2],
    ]
}

/// 行向量约定：cart = frac · M
fn frac_to_cart(frac: [f64; 3], matrix: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        frac[0] * matrix[0][0] + frac[1] * matrix[1][0] + frac[2] * matrix[2][0],
        frac[0] * matrix[0][1] + frac[1] * matrix[1][1] + frac[2] * matrix[2][1],
        frac[0] * matrix[0][2] + frac[1] * matrix[1][2] + frac[2] * matrix[2][2],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lattice;

    #[test]
    fn test_free_dimer_within_cutoff() {
        let s = Structure::new(
            vec!["H".to_string(), "H".to_string()],
            vec![[0.0, 0.0, 0.0], [1.5, 0.0, 0.0]],
        );
        let nl = NeighborList::build(&s, 3.0).unwrap();
        assert_eq!(nl.pairs.len(), 1);
        assert!((nl.pairs[0].distance - 1.5).abs() < 1e-12);
        assert!((nl.pairs[0].unit[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_free_dimer_outside_cutoff() {
        let s = Structure::new(
            vec!["H".to_string(), "H".to_string()],
            vec![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]],
        );
        let nl = NeighborList::build(&s, 3.0).unwrap();
        assert!(nl.pairs.is_empty());
    }

    #[test]
    fn test_periodic_minimum_image() {
        let mut s = Structure::new(
            vec!["Ar".to_string(), "Ar".to_string()],
            vec![[0.5, 5.0, 5.0], [9.5, 5.0, 5.0]],
        );
        s.cell = Some(Lattice::from_vectors([
            [10.0, 0.0, 0.0],
            [0.0, 10.0, 0.0],
            [0.0, 0.0, 10.0],
        ]));
        s.pbc = [true; 3];

        // 跨边界最近镜像距离为 1.0，而非 9.0
        let nl = NeighborList::build(&s, 3.0).unwrap();
        assert_eq!(nl.pairs.len(), 1);
        assert!((nl.pairs[0].distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_periodic_cutoff_too_large() {
        let mut s = Structure::new(vec!["Ar".to_string()], vec![[0.0; 3]]);
        s.cell = Some(Lattice::from_vectors([
            [6.0, 0.0, 0.0],
            [0.0, 6.0, 0.0],
            [0.0, 0.0, 6.0],
        ]));
        s.pbc = [true; 3];

        assert!(matches!(
            NeighborList::build(&s, 3.5),
            Err(PotkitError::CutoffTooLarge { .. })
        ));
    }

    #[test]
    fn test_coincident_atoms_skipped() {
        let s = Structure::new(
            vec!["H".to_string(), "H".to_string()],
            vec![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
        );
        let nl = NeighborList::build(&s, 3.0).unwrap();
        assert!(nl.pairs.is_empty());
    }
}
