use serde::{Deserialize, Serialize};

use crate::my_types::*;
use crate::particle::Particle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(clap::ArgEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CentroidMode {
    /// Plain mean of the positions
    Unweighted,
    /// Mean weighted by `Particle::weight`, falls back to the plain mean when all weights are zero
    Weighted,
}

/// Centroid of the population, `None` when it is empty.
pub fn estimate(particles: &[Particle], mode: CentroidMode) -> Option<Vector2d> {
    if particles.is_empty() {
        return None;
    }
    if mode == CentroidMode::Weighted {
        let weight_sum: f64 = particles.iter().map(|p| p.weight).sum();
        if weight_sum > 0. {
            let sum = particles
                .iter()
                .fold(Vector2d::zeros(), |acc, p| acc + p.weight * p.position);
            return Some(sum / weight_sum);
        }
    }
    let sum = particles.iter().fold(Vector2d::zeros(), |acc, p| acc + p.position);
    Some(sum / particles.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f64, y: f64, weight: f64) -> Particle {
        Particle {
            weight,
            ..Particle::new(Vector2d::new(x, y))
        }
    }

    #[test]
    fn test_unweighted_mean_ignores_weights() {
        let particles = [particle(0., 0., 0.9), particle(4., 2., 0.1)];
        let c = estimate(&particles, CentroidMode::Unweighted).unwrap();
        assert_eq!(c, Vector2d::new(2., 1.));
    }

    #[test]
    fn test_weighted_mean() {
        let particles = [particle(0., 0., 3.), particle(4., 8., 1.)];
        let c = estimate(&particles, CentroidMode::Weighted).unwrap();
        assert!((c - Vector2d::new(1., 2.)).norm() < 1e-12);
    }

    #[test]
    fn test_weighted_falls_back_without_weights() {
        let particles = [particle(0., 0., 0.), particle(4., 2., 0.)];
        let c = estimate(&particles, CentroidMode::Weighted).unwrap();
        assert_eq!(c, Vector2d::new(2., 1.));
    }

    #[test]
    fn test_empty_population() {
        assert!(estimate(&[], CentroidMode::Unweighted).is_none());
        assert!(estimate(&[], CentroidMode::Weighted).is_none());
    }
}
