use crate::particle::Particle;

/// Constant velocity step.
pub fn predict(particle: &Particle) -> Particle {
    Particle {
        position: particle.position + particle.velocity,
        ..*particle
    }
}

pub fn predict_all(particles: &[Particle]) -> Vec<Particle> {
    particles.iter().map(predict).collect()
}
