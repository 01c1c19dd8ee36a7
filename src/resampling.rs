use std::f64::consts::PI;

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::my_types::*;
use crate::particle::Particle;

/// How fractional spawn quotas become whole particle counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(clap::ArgEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnRounding {
    /// Truncate each quota independently. The population may end up short of N.
    Floor,
    /// Hand the truncated residual to the largest fractional parts, filling N exactly.
    LargestRemainder,
}

/// Normalize likelihoods over the survivors. All weights are zero when the
/// likelihoods sum to zero.
pub fn reweight(survivors: &[Particle]) -> Vec<Particle> {
    let likelihood_sum: f64 = survivors.iter().map(|p| p.likelihood).sum();
    survivors
        .iter()
        .map(|p| Particle {
            weight: if likelihood_sum > 0. { p.likelihood / likelihood_sum } else { 0. },
            ..*p
        })
        .collect()
}

pub fn spawn_counts(weights: &[f64], deficit: usize, rounding: SpawnRounding) -> Vec<usize> {
    let quotas: Vec<f64> = weights.iter().map(|w| w * deficit as f64).collect();
    let mut counts: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();
    if rounding == SpawnRounding::Floor {
        return counts;
    }

    let quota_sum: f64 = quotas.iter().sum();
    let target = (quota_sum.round() as usize).min(deficit);
    let assigned: usize = counts.iter().sum();
    let residual = target.saturating_sub(assigned);
    if residual == 0 {
        return counts;
    }
    let mut order: Vec<usize> = (0..counts.len()).collect();
    // Stable, so equal remainders favour the earlier survivor.
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra)
    });
    for &i in order.iter().take(residual) {
        counts[i] += 1;
    }
    counts
}

/// Refills the population around weighted survivors.
#[derive(Clone, Debug, PartialEq)]
pub struct Resampler {
    pub target_size: usize,
    pub noise_scale: f64,
    pub rounding: SpawnRounding,
}

impl Resampler {
    pub fn new(config: &Config) -> Self {
        Self {
            target_size: config.num_particles,
            noise_scale: config.noise_scale,
            rounding: config.spawn_rounding,
        }
    }

    /// Children per survivor, in survivor order.
    pub fn spawn_counts(&self, survivors: &[Particle]) -> Vec<usize> {
        let deficit = self.target_size.saturating_sub(survivors.len());
        let weights: Vec<f64> = survivors.iter().map(|p| p.weight).collect();
        spawn_counts(&weights, deficit, self.rounding)
    }

    /// Children only. The radius deviation grows with the frame size and
    /// shrinks as the parent's likelihood approaches one.
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        survivors: &[Particle],
        shape: ImageShape,
        rng: &mut R,
    ) -> Vec<Particle> {
        let sigma = self.noise_scale * (shape.0 + shape.1) as f64;
        let counts = self.spawn_counts(survivors);
        let mut spawned = Vec::with_capacity(counts.iter().sum());
        for (parent, &count) in survivors.iter().zip(&counts) {
            for _ in 0..count {
                let z: f64 = rng.sample(StandardNormal);
                let r = z * sigma * (1. - parent.likelihood);
                let angle = rng.gen_range(-PI..PI);
                let position = parent.position + Vector2d::new(r * angle.cos(), r * angle.sin());
                spawned.push(Particle {
                    position,
                    velocity: position - parent.position,
                    likelihood: parent.likelihood,
                    weight: parent.weight,
                    alive: false,
                });
            }
        }
        spawned
    }

    /// Survivors followed by their children.
    pub fn resample<R: Rng + ?Sized>(
        &self,
        survivors: &[Particle],
        shape: ImageShape,
        rng: &mut R,
    ) -> Vec<Particle> {
        let mut population = survivors.to_vec();
        population.extend(self.spawn(survivors, shape, rng));
        population
    }
}
