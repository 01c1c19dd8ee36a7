use crate::config::Config;
use crate::image::ColorFrame;
use crate::my_types::*;
use crate::particle::Particle;

pub trait LikelihoodModel {
    /// Match of the frame at `position` against the target, in [0, 1].
    fn score(&self, position: Vector2d, frame: &dyn ColorFrame) -> f64;
}

/// Weighted hue and saturation distance from a reference colour.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorLikelihood {
    pub target_hue: f64,
    pub target_saturation: f64,
    pub hue_range: f64,
    pub saturation_range: f64,
    pub hue_weight: f64,
    pub saturation_weight: f64,
}

impl ColorLikelihood {
    pub fn new(config: &Config) -> Self {
        Self {
            target_hue: config.target_hue,
            target_saturation: config.target_saturation,
            hue_range: config.hue_range,
            saturation_range: config.saturation_range,
            hue_weight: config.hue_weight,
            saturation_weight: config.saturation_weight,
        }
    }

    fn mismatch(&self, hue: f64, saturation: f64) -> f64 {
        let hue_distance = (hue - self.target_hue).abs() / self.hue_range;
        let saturation_distance = (saturation - self.target_saturation).abs() / self.saturation_range;
        self.hue_weight * hue_distance + self.saturation_weight * saturation_distance
    }
}

impl LikelihoodModel for ColorLikelihood {
    fn score(&self, position: Vector2d, frame: &dyn ColorFrame) -> f64 {
        let Some((x, y)) = nearest_pixel(position, frame.shape()) else {
            return 0.;
        };
        let mismatch = self.mismatch(frame.hue(x, y), frame.saturation(x, y));
        (1. - mismatch).clamp(0., 1.)
    }
}

/// Pixel containing `position`, or `None` when it lies outside `[0, w-1] x [0, h-1]`.
pub fn nearest_pixel(position: Vector2d, shape: ImageShape) -> Option<(usize, usize)> {
    let (width, height) = shape;
    if width == 0 || height == 0 {
        return None;
    }
    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;
    // NaN fails every comparison and lands outside too
    let inside = position.x >= 0. && position.x <= max_x && position.y >= 0. && position.y <= max_y;
    if !inside {
        return None;
    }
    Some((position.x.round() as usize, position.y.round() as usize))
}

/// Rescore every particle against `frame`.
pub fn score_all(
    particles: &[Particle],
    model: &dyn LikelihoodModel,
    frame: &dyn ColorFrame,
) -> Vec<Particle> {
    particles
        .iter()
        .map(|p| Particle {
            likelihood: model.score(p.position, frame),
            ..*p
        })
        .collect()
}
