use crate::config::Config;
use crate::particle::Particle;

/// Keeps a particle when it is absolutely good (likelihood above the
/// threshold) or relatively good (within the top slice of the ranking).
#[derive(Clone, Debug, PartialEq)]
pub struct SurvivalPolicy {
    pub likelihood_threshold: f64,
    pub keep_fraction: f64,
}

impl SurvivalPolicy {
    pub fn new(config: &Config) -> Self {
        Self {
            likelihood_threshold: config.likelihood_threshold,
            keep_fraction: config.keep_fraction,
        }
    }

    /// `ceil(population_size * keep_fraction)`, capped at the population size.
    pub fn keep_count(&self, population_size: usize) -> usize {
        let k = population_size as f64 * self.keep_fraction;
        // Products like 100 * 0.07 = 7.000000000000001 count as whole
        let k = if (k - k.round()).abs() <= 1e-9 * k {
            k.round()
        } else {
            k.ceil()
        };
        (k.max(0.) as usize).min(population_size)
    }

    /// Sort by likelihood ascending (stable) and set `alive` on every particle.
    pub fn rank(&self, particles: &[Particle]) -> Vec<Particle> {
        let mut ranked = particles.to_vec();
        ranked.sort_by(|a, b| a.likelihood.total_cmp(&b.likelihood));
        let first_kept = ranked.len() - self.keep_count(ranked.len());
        for (i, p) in ranked.iter_mut().enumerate() {
            p.alive = p.likelihood > self.likelihood_threshold || i >= first_kept;
        }
        ranked
    }

    /// Survivors in ascending likelihood order.
    pub fn prune(&self, particles: &[Particle]) -> Vec<Particle> {
        self.rank(particles).into_iter().filter(|p| p.alive).collect()
    }
}
