//! # Langevin 动力学
//!
//! BAOAB 格式的 Langevin 恒温积分器。摩擦系数与温度为零时退化为
//! 速度 Verlet。速度按 Maxwell–Boltzmann 分布初始化并去除整体动量，
//! 随机数由可指定种子的 `StdRng` 产生，保证同参数重复运行逐位一致。
//!
//! ## 依赖关系
//! - 被 `commands/generate.rs` 使用
//! - 使用 `potential/calculator.rs` 的 `Calculator` 接口
//! - 使用 `utils/units.rs` 单位常数

use crate::error::Result;
use crate::models::Structure;
use crate::potential::Calculator;
use crate::utils::units;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// 每步回调可见的状态
#[derive(Debug, Clone, Copy)]
pub struct StepInfo {
    /// 已完成的步数（从 1 开始）
    pub step: usize,
    /// 模拟时间 (fs)
    pub time: f64,
    /// 瞬时温度 (K)
    pub temperature: f64,
    /// 势能 (eV)
    pub potential_energy: f64,
    /// 动能 (eV)
    pub kinetic_energy: f64,
    /// 总能 (eV)
    pub total_energy: f64,
}

/// Langevin 积分器
pub struct Langevin<'a, C: Calculator> {
    calculator: &'a C,
    /// 步长（内部时间单位）
    dt: f64,
    /// 目标温度 (K)
    temperature: f64,
    /// 摩擦系数（内部时间单位的倒数）
    friction: f64,
    rng: StdRng,
}

impl<'a, C: Calculator> Langevin<'a, C> {
    /// 创建积分器；步长单位 fs，摩擦单位 fs⁻¹
    pub fn new(
        calculator: &'a C,
        timestep_fs: f64,
        temperature_k: f64,
        friction_per_fs: f64,
        seed: u64,
    ) -> Self {
        Langevin {
            calculator,
            dt: timestep_fs * units::FS,
            temperature: temperature_k,
            friction: friction_per_fs / units::FS,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Maxwell–Boltzmann 速度初始化并去除整体动量
    pub fn initialize_momenta(&mut self, structure: &mut Structure) -> Result<()> {
        let masses = structure.masses()?;
        let n = structure.len();

        let mut momenta = vec![[0.0; 3]; n];
        for (p, &m) in momenta.iter_mut().zip(masses.iter()) {
            let scale = (m * units::KB * self.temperature).sqrt();
            for axis in 0..3 {
                let xi: f64 = self.rng.sample(StandardNormal);
                p[axis] = scale * xi;
            }
        }

        // 去除整体动量
        let total_mass: f64 = masses.iter().sum();
        let mut com_velocity = [0.0; 3];
        for p in &momenta {
            for axis in 0..3 {
                com_velocity[axis] += p[axis] / total_mass;
            }
        }
        for (p, &m) in momenta.iter_mut().zip(masses.iter()) {
            for axis in 0..3 {
                p[axis] -= m * com_velocity[axis];
            }
        }

        structure.momenta = Some(momenta);
        Ok(())
    }

    /// 运行 n_steps 步；每步结束后以最新状态调用 observer。
    ///
    /// 结构上未携带动量时先做 Maxwell–Boltzmann 初始化；
    /// 每步把势能与受力附着到结构上，供采样回调直接拷贝。
    pub fn run<F>(
        &mut self,
        structure: &mut Structure,
        n_steps: usize,
        mut observer: F,
    ) -> Result<()>
    where
        F: FnMut(&StepInfo, &Structure),
    {
        let masses = structure.masses()?;

        if structure.momenta.is_none() {
            self.initialize_momenta(structure)?;
        }

        let mut evaluation = self.calculator.evaluate(structure)?;

        let c1 = (-self.friction * self.dt).exp();
        let noise_factor = (units::KB * self.temperature * (1.0 - c1 * c1)).sqrt();
        let dt_half = 0.5 * self.dt;

        for step in 1..=n_steps {
            // B: 半步动量
            {
                let momenta = structure.momenta.as_mut().unwrap();
                for (p, f) in momenta.iter_mut().zip(evaluation.forces.iter()) {
                    for axis in 0..3 {
                        p[axis] += dt_half * f[axis];
                    }
                }
            }

            // A: 半步位置
            advance_positions(structure, &masses, dt_half);

            // O: 热浴
            {
                let momenta = structure.momenta.as_mut().unwrap();
                for (p, &m) in momenta.iter_mut().zip(masses.iter()) {
                    let sigma = noise_factor * m.sqrt();
                    for axis in 0..3 {
                        let xi: f64 = self.rng.sample(StandardNormal);
                        p[axis] = c1 * p[axis] + sigma * xi;
                    }
                }
            }

            // A: 半步位置
            advance_positions(structure, &masses, dt_half);

            // 重新求力，B: 半步动量
            evaluation = self.calculator.evaluate(structure)?;
            {
                let momenta = structure.momenta.as_mut().unwrap();
                for (p, f) in momenta.iter_mut().zip(evaluation.forces.iter()) {
                    for axis in 0..3 {
                        p[axis] += dt_half * f[axis];
                    }
                }
            }

            structure.energy = Some(evaluation.energy);
            structure.forces = Some(evaluation.forces.clone());

            let kinetic = structure.kinetic_energy()?;
            let info = StepInfo {
                step,
                time: step as f64 * self.dt / units::FS,
                temperature: structure.temperature()?,
                potential_energy: evaluation.energy,
                kinetic_energy: kinetic,
                total_energy: evaluation.energy + kinetic,
            };
            observer(&info, structure);
        }

        Ok(())
    }
}

fn advance_positions(structure: &mut Structure, masses: &[f64], dt: f64) {
    let momenta = structure.momenta.as_ref().unwrap().clone();
    for ((x, p), &m) in structure
        .positions
        .iter_mut()
        .zip(momenta.iter())
        .zip(masses.iter())
    {
        for axis in 0..3 {
            x[axis] += dt * p[axis] / m;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potential::calculator::Evaluation;

    /// 谐振子二聚体测试势
    struct HarmonicDimer {
        k: f64,
        r0: f64,
    }

    impl Calculator for HarmonicDimer {
        fn evaluate(&self, structure: &Structure) -> Result<Evaluation> {
            let a = structure.positions[0];
            let b = structure.positions[1];
            let delta = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let r = (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();

            let energy = 0.5 * self.k * (r - self.r0) * (r - self.r0);
            let f_mag = -self.k * (r - self.r0);
            let unit = [delta[0] / r, delta[1] / r, delta[2] / r];

            Ok(Evaluation {
                energy,
                forces: vec![
                    [-f_mag * unit[0], -f_mag * unit[1], -f_mag * unit[2]],
                    [f_mag * unit[0], f_mag * unit[1], f_mag * unit[2]],
                ],
            })
        }
    }

    fn dimer(r: f64) -> Structure {
        Structure::new(
            vec!["H".to_string(), "H".to_string()],
            vec![[0.0, 0.0, 0.0], [r, 0.0, 0.0]],
        )
    }

    #[test]
    fn test_initialize_momenta_zero_net_momentum() {
        let calc = HarmonicDimer { k: 5.0, r0: 1.1 };
        let mut integrator = Langevin::new(&calc, 0.5, 300.0, 0.1, 42);
        let mut s = dimer(1.1);
        integrator.initialize_momenta(&mut s).unwrap();

        let momenta = s.momenta.as_ref().unwrap();
        for axis in 0..3 {
            let total: f64 = momenta.iter().map(|p| p[axis]).sum();
            assert!(total.abs() < 1e-12);
        }
        assert!(s.kinetic_energy().unwrap() > 0.0);
    }

    #[test]
    fn test_nve_limit_conserves_energy() {
        // T=0, γ=0 退化为速度 Verlet，总能应近似守恒
        let calc = HarmonicDimer { k: 5.0, r0: 1.1 };
        let mut integrator = Langevin::new(&calc, 0.25, 0.0, 0.0, 7);
        let mut s = dimer(1.3);
        s.momenta = Some(vec![[0.0; 3]; 2]);

        let mut energies = Vec::new();
        integrator
            .run(&mut s, 200, |info, _| energies.push(info.total_energy))
            .unwrap();

        let first = energies[0];
        for &e in &energies {
            assert!(
                (e - first).abs() < 1e-3,
                "total energy drifted: {} vs {}",
                e,
                first
            );
        }
    }

    #[test]
    fn test_same_seed_reproduces_trajectory() {
        let calc = HarmonicDimer { k: 5.0, r0: 1.1 };

        let run = |seed: u64| {
            let mut integrator = Langevin::new(&calc, 0.5, 300.0, 0.1, seed);
            let mut s = dimer(1.2);
            let mut last = Vec::new();
            integrator
                .run(&mut s, 50, |_, structure| {
                    last = structure.positions.clone();
                })
                .unwrap();
            last
        };

        let a = run(42);
        let b = run(42);
        assert_eq!(a, b);

        let c = run(43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let calc = HarmonicDimer { k: 5.0, r0: 1.1 };
        let mut integrator = Langevin::new(&calc, 0.5, 300.0, 0.1, 1);
        let mut s = dimer(1.1);

        let mut steps = Vec::new();
        integrator
            .run(&mut s, 10, |info, structure| {
                steps.push(info.step);
                assert!(structure.energy.is_some());
                assert!(structure.forces.is_some());
            })
            .unwrap();
        assert_eq!(steps, (1..=10).collect::<Vec<_>>());
    }
}
