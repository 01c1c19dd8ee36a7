use anyhow::{bail, Result};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;
use tracing::{debug, info, instrument, trace_span, warn};

use crate::config::Config;
use crate::estimator::{estimate, CentroidMode};
use crate::image::ColorFrame;
use crate::likelihood::{score_all, ColorLikelihood, LikelihoodModel};
use crate::motion::predict_all;
use crate::my_types::*;
use crate::particle::{uniform_population, Particle};
use crate::pruning::SurvivalPolicy;
use crate::resampling::{reweight, Resampler};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    /// No frame seen yet, the population is empty
    Uninitialized,
    /// Waiting for the next frame
    Ready,
    Shutdown,
}

/// Steps of one cycle, in their required order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Predicting,
    Scoring,
    Pruning,
    Reweighting,
    Resampling,
    Estimating,
}

/// Outcome of one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TickReport {
    /// 1 for the first processed frame
    pub frame_number: usize,
    pub centroid: Vector2d,
    pub max_likelihood: f64,
    pub survivors: usize,
    pub spawned: usize,
    /// Population size carried into the next frame
    pub population: usize,
    /// No plausible hypothesis was left. The centroid is the previous one
    /// and the population has been reseeded.
    pub target_lost: bool,
}

/// Single target particle filter, one cycle per frame.
pub struct ParticleTracker<L, R> {
    likelihood: L,
    policy: SurvivalPolicy,
    resampler: Resampler,
    centroid_mode: CentroidMode,
    reseed_on_zero_likelihood: bool,
    target_size: usize,
    rng: R,

    state: TrackerState,
    shape: ImageShape,
    particles: Vec<Particle>,
    // `particles[..survivor_count]` survived the last pruning, the rest were generated after it.
    survivor_count: usize,
    centroid: Vector2d,
    frame_number: usize,
}

impl ParticleTracker<ColorLikelihood, Xoshiro256PlusPlus> {
    /// Colour likelihood and a xoshiro generator seeded from `config.seed`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config,
            ColorLikelihood::new(config),
            Xoshiro256PlusPlus::seed_from_u64(config.seed),
        )
    }
}

impl<L: LikelihoodModel, R: Rng> ParticleTracker<L, R> {
    pub fn new(config: &Config, likelihood: L, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            likelihood,
            policy: SurvivalPolicy::new(config),
            resampler: Resampler::new(config),
            centroid_mode: config.centroid,
            reseed_on_zero_likelihood: config.reseed_on_zero_likelihood,
            target_size: config.num_particles,
            rng,
            state: TrackerState::Uninitialized,
            shape: (0, 0),
            particles: vec![],
            survivor_count: 0,
            centroid: Vector2d::zeros(),
            frame_number: 0,
        })
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles kept by the last pruning.
    pub fn survivors(&self) -> &[Particle] {
        &self.particles[..self.survivor_count]
    }

    /// Particles generated in the last cycle, by resampling or by a reseed.
    pub fn spawned(&self) -> &[Particle] {
        &self.particles[self.survivor_count..]
    }

    /// Latest estimate. The frame centre right after initialization.
    pub fn centroid(&self) -> Option<Vector2d> {
        match self.state {
            TrackerState::Uninitialized => None,
            _ => Some(self.centroid),
        }
    }

    pub fn frame_number(&self) -> usize {
        self.frame_number
    }

    /// Seed the population uniformly over a frame of `shape`.
    /// Called implicitly by the first `process`.
    pub fn initialize(&mut self, shape: ImageShape) -> Result<()> {
        if self.state == TrackerState::Shutdown {
            bail!("cannot initialize a tracker that has been shut down");
        }
        if shape.0 == 0 || shape.1 == 0 {
            bail!("cannot initialize over an empty {} x {} frame", shape.0, shape.1);
        }
        self.shape = shape;
        self.reseed();
        self.centroid = Vector2d::new(shape.0 as f64 / 2., shape.1 as f64 / 2.);
        self.state = TrackerState::Ready;
        info!("seeded {} particles over {} x {}", self.particles.len(), shape.0, shape.1);
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if self.state != TrackerState::Shutdown {
            info!("tracker shut down after {} frames", self.frame_number);
        }
        self.state = TrackerState::Shutdown;
    }

    /// Run one full cycle on `frame`. The population is only replaced once
    /// every stage has finished.
    #[instrument(skip_all, fields(frame = self.frame_number + 1))]
    pub fn process(&mut self, frame: &dyn ColorFrame) -> Result<TickReport> {
        let shape = frame.shape();
        match self.state {
            TrackerState::Shutdown => bail!("tracker has been shut down"),
            TrackerState::Uninitialized => self.initialize(shape)?,
            TrackerState::Ready => {
                if shape.0 == 0 || shape.1 == 0 {
                    bail!("empty {} x {} frame", shape.0, shape.1);
                }
                if shape != self.shape {
                    debug!("frame size changed from {:?} to {:?}", self.shape, shape);
                    self.shape = shape;
                }
            }
        }
        self.frame_number += 1;

        let predicted = {
            let _stage = trace_span!("stage", stage = ?Stage::Predicting).entered();
            predict_all(&self.particles)
        };

        let scored = {
            let _stage = trace_span!("stage", stage = ?Stage::Scoring).entered();
            score_all(&predicted, &self.likelihood, frame)
        };
        let max_likelihood = scored.iter().map(|p| p.likelihood).fold(0., f64::max);

        let survivors = {
            let _stage = trace_span!("stage", stage = ?Stage::Pruning).entered();
            self.policy.prune(&scored)
        };

        let survivors = {
            let _stage = trace_span!("stage", stage = ?Stage::Reweighting).entered();
            reweight(&survivors)
        };
        let implausible = survivors.iter().all(|p| p.likelihood == 0.);

        if survivors.is_empty() || (self.reseed_on_zero_likelihood && implausible) {
            warn!(
                "target lost with {} survivors, reseeding {} particles",
                survivors.len(),
                self.target_size
            );
            self.reseed();
            return Ok(self.report(max_likelihood, 0, 0, true));
        }

        let spawned = {
            let _stage = trace_span!("stage", stage = ?Stage::Resampling).entered();
            self.resampler.spawn(&survivors, self.shape, &mut self.rng)
        };
        let (survivor_count, spawned_count) = (survivors.len(), spawned.len());
        let mut population = survivors;
        population.extend(spawned);

        {
            let _stage = trace_span!("stage", stage = ?Stage::Estimating).entered();
            if let Some(centroid) = estimate(&population, self.centroid_mode) {
                self.centroid = centroid;
            }
        }

        self.particles = population;
        self.survivor_count = survivor_count;
        debug!(
            "{} survivors, {} spawned, max likelihood {:.3}",
            survivor_count, spawned_count, max_likelihood
        );
        Ok(self.report(max_likelihood, survivor_count, spawned_count, false))
    }

    fn reseed(&mut self) {
        self.particles = uniform_population(self.shape, self.target_size, &mut self.rng);
        self.survivor_count = 0;
    }

    fn report(
        &self,
        max_likelihood: f64,
        survivors: usize,
        spawned: usize,
        target_lost: bool,
    ) -> TickReport {
        TickReport {
            frame_number: self.frame_number,
            centroid: self.centroid,
            max_likelihood,
            survivors,
            spawned,
            population: self.particles.len(),
            target_lost,
        }
    }
}
