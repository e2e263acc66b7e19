//! Environment configuration regression test
//!
//! Runs as its own test binary so setting variables cannot race other
//! tests.

use blitkit_scale::{EngineConfig, ScaleEngine, ScaleError, ScalingAlgorithm};
use blitkit_test::RegParams;

#[test]
fn env_reg() {
    let mut rp = RegParams::new("env");

    // --- Test 1: nothing set gives the defaults ---
    let config = EngineConfig::from_env();
    rp.compare_values(1.0, (config == EngineConfig::default()) as u8 as f64, 0.0);

    // SAFETY: this test is the only one in its binary, so no other thread
    // reads the environment concurrently.
    unsafe {
        std::env::set_var("BLITKIT_THREADS", " 3 ");
        std::env::set_var("BLITKIT_DISABLE_HOST_SCALING", "Yes");
        std::env::set_var("BLITKIT_SPLIT_THRESHOLD_BICUBIC", "4096");
        std::env::set_var("BLITKIT_SPLIT_THRESHOLD_NEAREST", "not a number");
    }

    // --- Test 2: variables overlay the defaults ---
    let config = EngineConfig::from_env();
    rp.compare_values(3.0, config.threads.unwrap_or(0) as f64, 0.0);
    rp.compare_values(0.0, config.host_native_usable as u8 as f64, 0.0);
    rp.compare_values(4096.0, config.thresholds.bicubic as f64, 0.0);
    let nearest = EngineConfig::default().thresholds.nearest;
    rp.compare_values(nearest as f64, config.thresholds.nearest as f64, 0.0);
    let engine = ScaleEngine::from_env().expect("engine");
    rp.compare_values(3.0, engine.config().threads.unwrap_or(0) as f64, 0.0);

    // --- Test 3: a threshold of 1 parses but fails validation ---
    unsafe {
        std::env::set_var("BLITKIT_SPLIT_THRESHOLD_BOX_SAMPLED", "1");
    }
    let err = ScaleEngine::from_env().err();
    let rejected = matches!(
        err,
        Some(ScaleError::InvalidThreshold {
            algorithm: ScalingAlgorithm::BoxSampled,
            value: 1
        })
    );
    rp.compare_values(1.0, rejected as u8 as f64, 0.0);

    assert!(rp.cleanup());
}
