//! Engine configuration
//!
//! [`EngineConfig`] is built with `Default` plus builder methods, or read
//! from the process environment with [`EngineConfig::from_env`].

use crate::algorithm::ScalingAlgorithm;
use crate::env_config::{
    DISABLE_HOST_VAR, SPLIT_THRESHOLD_PREFIX, THREADS_VAR, env_var_positive_u64, env_var_truthy,
};
use crate::error::{ScaleError, ScaleResult};

/// Smallest accepted split threshold
pub const MIN_SPLIT_THRESHOLD: u64 = 2;

/// Default number of pooled scratch buffers kept between jobs
pub const DEFAULT_SCRATCH_RETAIN: usize = 4;

/// Per-algorithm destination area above which a row band is split
///
/// Cheaper algorithms get smaller thresholds: a band of nearest-neighbor
/// work is worth handing to another thread sooner than a band of bicubic
/// work of the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitThresholds {
    pub nearest: u64,
    pub bilinear: u64,
    pub bicubic: u64,
    pub box_sampled: u64,
}

impl Default for SplitThresholds {
    fn default() -> Self {
        Self {
            nearest: 16_384,
            bilinear: 32_768,
            bicubic: 65_536,
            box_sampled: 65_536,
        }
    }
}

impl SplitThresholds {
    /// Same threshold for every algorithm.
    pub const fn uniform(value: u64) -> Self {
        Self {
            nearest: value,
            bilinear: value,
            bicubic: value,
            box_sampled: value,
        }
    }

    /// Threshold for one algorithm.
    pub fn get(&self, algorithm: ScalingAlgorithm) -> u64 {
        match algorithm {
            ScalingAlgorithm::Nearest => self.nearest,
            ScalingAlgorithm::Bilinear => self.bilinear,
            ScalingAlgorithm::Bicubic => self.bicubic,
            ScalingAlgorithm::BoxSampled => self.box_sampled,
        }
    }

    /// Replace the threshold for one algorithm.
    pub fn set(&mut self, algorithm: ScalingAlgorithm, value: u64) {
        let slot = match algorithm {
            ScalingAlgorithm::Nearest => &mut self.nearest,
            ScalingAlgorithm::Bilinear => &mut self.bilinear,
            ScalingAlgorithm::Bicubic => &mut self.bicubic,
            ScalingAlgorithm::BoxSampled => &mut self.box_sampled,
        };
        *slot = value;
    }

    /// Check every threshold against [`MIN_SPLIT_THRESHOLD`].
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::InvalidThreshold`] for the first offender.
    pub fn validate(&self) -> ScaleResult<()> {
        for algorithm in ScalingAlgorithm::ALL {
            let value = self.get(algorithm);
            if value < MIN_SPLIT_THRESHOLD {
                return Err(ScaleError::InvalidThreshold { algorithm, value });
            }
        }
        Ok(())
    }
}

/// Scaling engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads, `None` for rayon's global pool
    pub threads: Option<usize>,
    pub thresholds: SplitThresholds,
    /// Whether the host compositing primitive may be used at all
    pub host_native_usable: bool,
    /// Scratch buffers kept in the pool after a job returns
    pub scratch_retain: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            thresholds: SplitThresholds::default(),
            host_native_usable: true,
            scratch_retain: DEFAULT_SCRATCH_RETAIN,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_thresholds(mut self, thresholds: SplitThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_threshold(mut self, algorithm: ScalingAlgorithm, value: u64) -> Self {
        self.thresholds.set(algorithm, value);
        self
    }

    pub fn with_host_native(mut self, usable: bool) -> Self {
        self.host_native_usable = usable;
        self
    }

    pub fn with_scratch_retain(mut self, retain: usize) -> Self {
        self.scratch_retain = retain;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::InvalidThreshold`] for a threshold below 2 and
    /// [`ScaleError::InvalidParameters`] for a zero thread count.
    pub fn validate(&self) -> ScaleResult<()> {
        if self.threads == Some(0) {
            return Err(ScaleError::InvalidParameters(
                "thread count must be positive".to_string(),
            ));
        }
        self.thresholds.validate()
    }

    /// Defaults overlaid with the `BLITKIT_*` environment variables.
    ///
    /// | variable | effect |
    /// |---|---|
    /// | `BLITKIT_THREADS` | worker thread count |
    /// | `BLITKIT_DISABLE_HOST_SCALING` | truthy value disables host delegation |
    /// | `BLITKIT_SPLIT_THRESHOLD_<ALGO>` | split threshold for one algorithm |
    ///
    /// `<ALGO>` is `NEAREST`, `BILINEAR`, `BICUBIC` or `BOX_SAMPLED`.
    /// Unparsable or non-positive values are ignored. A parsed threshold of
    /// 1 is kept, so [`EngineConfig::validate`] reports it.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(threads) = env_var_positive_u64(THREADS_VAR) {
            config.threads = Some(threads as usize);
        }
        if env_var_truthy(DISABLE_HOST_VAR) {
            config.host_native_usable = false;
        }
        for algorithm in ScalingAlgorithm::ALL {
            let var = format!("{SPLIT_THRESHOLD_PREFIX}{}", algorithm.env_name());
            if let Some(value) = env_var_positive_u64(&var) {
                config.thresholds.set(algorithm, value);
            }
        }
        config
    }
}
