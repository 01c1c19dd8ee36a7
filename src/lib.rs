pub mod config;
pub mod estimator;
pub mod hsv;
pub mod image;
pub mod likelihood;
pub mod motion;
pub mod my_types;
pub mod particle;
pub mod pruning;
pub mod resampling;
pub mod synthetic;
pub mod tracker;
pub mod video;
