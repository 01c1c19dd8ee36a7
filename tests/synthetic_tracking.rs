use particle_track::config::Config;
use particle_track::my_types::*;
use particle_track::synthetic::SyntheticSequence;
use particle_track::tracker::{ParticleTracker, TickReport};

const SHAPE: ImageShape = (320, 240);
const RADIUS: f64 = 12.;

fn run(config: &Config, velocity: Vector2d, frames: usize) -> Vec<(TickReport, Vector2d)> {
    let mut tracker = ParticleTracker::from_config(config).unwrap();
    SyntheticSequence::new(SHAPE, RADIUS, Vector2d::new(100., 90.), velocity, frames)
        .map(|frame| (tracker.process(&frame.image).unwrap(), frame.center))
        .collect()
}

fn config(seed: u64) -> Config {
    Config {
        seed,
        ..Config::default()
    }
}

#[test]
fn test_locks_onto_static_target() {
    let reports = run(&config(7), Vector2d::zeros(), 20);
    let (last, center) = reports.last().unwrap();
    assert!(!last.target_lost);
    assert_eq!(last.max_likelihood, 1.);
    assert!((last.centroid - center).norm() < RADIUS + 1., "{} vs {}", last.centroid, center);
}

#[test]
fn test_follows_moving_target() {
    let reports = run(&config(3), Vector2d::new(2., 1.), 60);
    let on_target = reports
        .iter()
        .filter(|(report, center)| (report.centroid - center).norm() < RADIUS + 1.)
        .count();
    assert!(on_target >= 15, "only {on_target} of 60 frames on target");
    for (report, _) in &reports {
        assert!(!report.target_lost);
        assert!(report.population <= 1000);
        assert!(report.survivors >= 1);
    }
}

#[test]
fn test_same_seed_same_reports() {
    let a = run(&config(11), Vector2d::new(-2., 1.), 10);
    let b = run(&config(11), Vector2d::new(-2., 1.), 10);
    let a: Vec<_> = a.into_iter().map(|(report, _)| report).collect();
    let b: Vec<_> = b.into_iter().map(|(report, _)| report).collect();
    assert_eq!(a, b);
}

#[test]
fn test_reports_serialize_as_json_lines() {
    let reports = run(&config(1), Vector2d::zeros(), 2);
    let line = serde_json::to_string(&reports[0].0).unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["frame_number"], 1);
    assert_eq!(value["centroid"].as_array().unwrap().len(), 2);
    assert_eq!(value["target_lost"], false);
}
