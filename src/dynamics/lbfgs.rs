//! # LBFGS 结构弛豫
//!
//! 两循环递推的有限记忆 BFGS，对原子坐标最小化势能。
//! 步长按单原子最大位移截断，收敛判据为最大受力分量。
//!
//! ## 依赖关系
//! - 被 `commands/optimize.rs` 使用
//! - 使用 `potential/calculator.rs` 的 `Calculator` 接口
//! - 使用 `nalgebra` 向量运算

use crate::error::Result;
use crate::models::Structure;
use crate::potential::Calculator;
use nalgebra::DVector;
use std::collections::VecDeque;

/// 初始 Hessian 对角近似的倒数 (Å²/eV)
const INITIAL_INVERSE_HESSIAN: f64 = 1.0 / 70.0;

/// 每次弛豫迭代的状态
#[derive(Debug, Clone, Copy)]
pub struct OptimizationStep {
    pub step: usize,
    /// 当前势能 (eV)
    pub energy: f64,
    /// 当前最大原子受力 (eV/Å)
    pub fmax: f64,
}

/// 弛豫结果
#[derive(Debug, Clone, Copy)]
pub struct OptimizationResult {
    pub converged: bool,
    pub steps: usize,
    pub energy: f64,
    pub fmax: f64,
}

/// LBFGS 弛豫器
pub struct Lbfgs<'a, C: Calculator> {
    calculator: &'a C,
    /// 历史对数
    memory: usize,
    /// 单原子最大步长 (Å)
    maxstep: f64,
}

impl<'a, C: Calculator> Lbfgs<'a, C> {
    pub fn new(calculator: &'a C) -> Self {
        Lbfgs {
            calculator,
            memory: 10,
            maxstep: 0.2,
        }
    }

    pub fn with_maxstep(mut self, maxstep: f64) -> Self {
        self.maxstep = maxstep;
        self
    }

    /// 弛豫至 fmax 低于阈值或达到最大步数；每次迭代调用 observer
    pub fn run<F>(
        &self,
        structure: &mut Structure,
        fmax_target: f64,
        max_steps: usize,
        mut observer: F,
    ) -> Result<OptimizationResult>
    where
        F: FnMut(&OptimizationStep, &Structure),
    {
        let mut history: VecDeque<(DVector<f64>, DVector<f64>, f64)> = VecDeque::new();

        let mut x = flatten(&structure.positions);
        let mut evaluation = self.calculator.evaluate(structure)?;
        let mut gradient = gradient_from_forces(&evaluation.forces);

        for step in 0..max_steps {
            let fmax = max_force(&evaluation.forces);
            observer(
                &OptimizationStep {
                    step,
                    energy: evaluation.energy,
                    fmax,
                },
                structure,
            );

            if fmax < fmax_target {
                structure.energy = Some(evaluation.energy);
                structure.forces = Some(evaluation.forces);
                return Ok(OptimizationResult {
                    converged: true,
                    steps: step,
                    energy: evaluation.energy,
                    fmax,
                });
            }

            // 两循环递推求搜索方向
            let mut q = gradient.clone();
            let mut alphas = Vec::with_capacity(history.len());
            for (s, y, rho) in history.iter().rev() {
                let alpha = rho * s.dot(&q);
                q -= y * alpha;
                alphas.push(alpha);
            }

            let gamma = match history.back() {
                Some((s, y, _)) => {
                    let yy = y.dot(y);
                    if yy > 1e-12 {
                        s.dot(y) / yy
                    } else {
                        INITIAL_INVERSE_HESSIAN
                    }
                }
                None => INITIAL_INVERSE_HESSIAN,
            };
            let mut r = q * gamma;

            for ((s, y, rho), alpha) in history.iter().zip(alphas.iter().rev()) {
                let beta = rho * y.dot(&r);
                r += s * (alpha - beta);
            }

            let mut direction = -r;

            // 截断单原子最大位移
            let longest = direction
                .as_slice()
                .chunks(3)
                .map(|d| (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt())
                .fold(0.0f64, f64::max);
            if longest > self.maxstep {
                direction *= self.maxstep / longest;
            }

            let x_new = &x + &direction;
            unflatten(&x_new, &mut structure.positions);

            let evaluation_new = self.calculator.evaluate(structure)?;
            let gradient_new = gradient_from_forces(&evaluation_new.forces);

            // 曲率条件满足时记录历史对
            let s_vec = &x_new - &x;
            let y_vec = &gradient_new - &gradient;
            let sy = s_vec.dot(&y_vec);
            if sy > 1e-10 {
                history.push_back((s_vec, y_vec, 1.0 / sy));
                if history.len() > self.memory {
                    history.pop_front();
                }
            }

            x = x_new;
            gradient = gradient_new;
            evaluation = evaluation_new;
        }

        let fmax = max_force(&evaluation.forces);
        structure.energy = Some(evaluation.energy);
        structure.forces = Some(evaluation.forces);
        Ok(OptimizationResult {
            converged: fmax < fmax_target,
            steps: max_steps,
            energy: evaluation.energy,
            fmax,
        })
    }
}

fn flatten(positions: &[[f64; 3]]) -> DVector<f64> {
    DVector::from_iterator(positions.len() * 3, positions.iter().flatten().copied())
}

fn unflatten(x: &DVector<f64>, positions: &mut [[f64; 3]]) {
    for (i, p) in positions.iter_mut().enumerate() {
        p[0] = x[3 * i];
        p[1] = x[3 * i + 1];
        p[2] = x[3 * i + 2];
    }
}

/// 梯度 = -受力
fn gradient_from_forces(forces: &[[f64; 3]]) -> DVector<f64> {
    DVector::from_iterator(forces.len() * 3, forces.iter().flatten().map(|f| -f))
}

/// 最大单原子受力模长
fn max_force(forces: &[[f64; 3]]) -> f64 {
    forces
        .iter()
        .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
        .fold(0.0, f64::max)
}
