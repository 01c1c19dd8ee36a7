use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};

use crate::estimator::CentroidMode;
use crate::resampling::SpawnRounding;

/// Set once by the binary after argument parsing. The library itself never reads it.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Clone, Debug, PartialEq)]
#[derive(clap::Parser, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target population size N
    #[clap(long, default_value = "1000")]
    pub num_particles: usize,

    /// Particles scoring above this always survive pruning
    #[clap(long, default_value = "0.9")]
    pub likelihood_threshold: f64,

    /// Fraction of the ranked population that survives regardless of score
    #[clap(long, default_value = "0.01")]
    pub keep_fraction: f64,

    #[clap(long, default_value = "70")]
    pub target_hue: f64,

    #[clap(long, default_value = "200")]
    pub target_saturation: f64,

    /// Span of the hue channel, 180 for 8-bit OpenCV style HSV
    #[clap(long, default_value = "180")]
    pub hue_range: f64,

    #[clap(long, default_value = "255")]
    pub saturation_range: f64,

    #[clap(long, default_value = "0.8")]
    pub hue_weight: f64,

    #[clap(long, default_value = "0.2")]
    pub saturation_weight: f64,

    /// Multiplies (width + height) to get the resampling radius deviation
    #[clap(long, default_value = "1.0")]
    pub noise_scale: f64,

    #[clap(long, default_value = "0")]
    pub seed: u64,

    #[clap(long, arg_enum, default_value = "unweighted")]
    pub centroid: CentroidMode,

    #[clap(long, arg_enum, default_value = "floor")]
    pub spawn_rounding: SpawnRounding,

    /// Treat survivors that all score zero as a lost target
    #[clap(long)]
    pub reseed_on_zero_likelihood: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_particles: 1000,
            likelihood_threshold: 0.9,
            keep_fraction: 0.01,
            target_hue: 70.,
            target_saturation: 200.,
            hue_range: 180.,
            saturation_range: 255.,
            hue_weight: 0.8,
            saturation_weight: 0.2,
            noise_scale: 1.,
            seed: 0,
            centroid: CentroidMode::Unweighted,
            spawn_rounding: SpawnRounding::Floor,
            reseed_on_zero_likelihood: false,
        }
    }
}

impl Config {
    /// Load a JSON config. Missing fields fall back to the defaults.
    pub fn from_json_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config: Config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("JSON deserialization failed for {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            bail!("num_particles must be positive");
        }
        if !(0. ..=1.).contains(&self.likelihood_threshold) {
            bail!("likelihood_threshold {} is outside [0, 1]", self.likelihood_threshold);
        }
        if !(0. ..=1.).contains(&self.keep_fraction) {
            bail!("keep_fraction {} is outside [0, 1]", self.keep_fraction);
        }
        if !(self.hue_range > 0.) || !(self.saturation_range > 0.) {
            bail!(
                "channel ranges must be positive, got hue {} saturation {}",
                self.hue_range,
                self.saturation_range
            );
        }
        if !(self.hue_weight >= 0.) || !(self.saturation_weight >= 0.) {
            bail!("channel weights must be non-negative");
        }
        if !(self.noise_scale >= 0.) {
            bail!("noise_scale {} must be non-negative", self.noise_scale);
        }
        Ok(())
    }
}
