use rand::Rng;
use serde::Serialize;

use crate::my_types::*;

/// One position hypothesis of the tracked target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Particle {
    /// Image coordinates, pixels
    pub position: Vector2d,
    /// Displacement per frame
    pub velocity: Vector2d,
    /// Match against the target colour in [0, 1], recomputed every frame
    pub likelihood: f64,
    /// Normalized likelihood over the survivors
    pub weight: f64,
    /// Set by the survival policy
    pub alive: bool,
}

impl Particle {
    /// A stationary particle that has not been scored yet.
    pub fn new(position: Vector2d) -> Self {
        Self {
            position,
            velocity: Vector2d::zeros(),
            likelihood: 1.,
            weight: 0.,
            alive: false,
        }
    }
}

/// `count` fresh particles spread uniformly over `[0, width) x [0, height)`.
pub fn uniform_population<R: Rng + ?Sized>(
    shape: ImageShape,
    count: usize,
    rng: &mut R,
) -> Vec<Particle> {
    let (width, height) = (shape.0 as f64, shape.1 as f64);
    (0..count)
        .map(|_| {
            Particle::new(Vector2d::new(
                rng.gen_range(0. ..width),
                rng.gen_range(0. ..height),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_uniform_population_covers_frame() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let shape = (200, 100);
        let particles = uniform_population(shape, 4000, &mut rng);
        assert_eq!(particles.len(), 4000);

        // Count per quadrant, each should hold about a quarter.
        let mut quadrants = [0usize; 4];
        for p in &particles {
            assert!(p.position.x >= 0. && p.position.x < 200.);
            assert!(p.position.y >= 0. && p.position.y < 100.);
            assert_eq!(p.velocity, Vector2d::zeros());
            assert_eq!(p.likelihood, 1.);
            assert_eq!(p.weight, 0.);
            let i = (p.position.x >= 100.) as usize + 2 * (p.position.y >= 50.) as usize;
            quadrants[i] += 1;
        }
        for count in quadrants {
            assert!((850..1150).contains(&count), "{quadrants:?}");
        }
    }
}
