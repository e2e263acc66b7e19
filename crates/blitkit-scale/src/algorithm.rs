//! Interpolation algorithm tags

use blitkit_core::InterpolationHint;
use std::fmt;

/// Resampling algorithm for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalingAlgorithm {
    /// Nearest-neighbor sampling (fastest, exact at identical spans)
    Nearest,
    /// Bilinear interpolation
    Bilinear,
    /// Bicubic (Catmull-Rom) interpolation
    Bicubic,
    /// Area averaging over each destination pixel's footprint
    ///
    /// The host primitive has no equivalent, so passes using it are never
    /// delegated.
    BoxSampled,
}

impl ScalingAlgorithm {
    /// Every algorithm.
    pub const ALL: [ScalingAlgorithm; 4] = [
        ScalingAlgorithm::Nearest,
        ScalingAlgorithm::Bilinear,
        ScalingAlgorithm::Bicubic,
        ScalingAlgorithm::BoxSampled,
    ];

    /// Hint token for the host primitive, `None` if it cannot do this.
    pub fn hint(self) -> Option<InterpolationHint> {
        match self {
            Self::Nearest => Some(InterpolationHint::NearestNeighbor),
            Self::Bilinear => Some(InterpolationHint::Bilinear),
            Self::Bicubic => Some(InterpolationHint::Bicubic),
            Self::BoxSampled => None,
        }
    }

    /// Algorithm matching a host hint token.
    pub fn from_hint(hint: InterpolationHint) -> Self {
        match hint {
            InterpolationHint::NearestNeighbor => Self::Nearest,
            InterpolationHint::Bilinear => Self::Bilinear,
            InterpolationHint::Bicubic => Self::Bicubic,
        }
    }

    /// Whether large reductions are done in halving rounds.
    pub fn iterates(self) -> bool {
        matches!(self, Self::Bilinear | Self::Bicubic)
    }

    /// Upper-case name used in environment variables.
    pub fn env_name(self) -> &'static str {
        match self {
            Self::Nearest => "NEAREST",
            Self::Bilinear => "BILINEAR",
            Self::Bicubic => "BICUBIC",
            Self::BoxSampled => "BOX_SAMPLED",
        }
    }
}

impl fmt::Display for ScalingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::BoxSampled => "box-sampled",
        };
        f.write_str(name)
    }
}

/// What a caller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalingRequest {
    /// One algorithm for the whole job
    Algorithm(ScalingAlgorithm),
    /// Iterative bilinear for reduction, bicubic for enlargement
    IterativeBilinearOrBicubic,
    /// Box sampling for reduction, bicubic for enlargement
    BoxSampledThenBicubic,
}

impl From<ScalingAlgorithm> for ScalingRequest {
    fn from(algorithm: ScalingAlgorithm) -> Self {
        Self::Algorithm(algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_has_no_hint() {
        assert_eq!(ScalingAlgorithm::BoxSampled.hint(), None);
        for a in ScalingAlgorithm::ALL {
            if let Some(h) = a.hint() {
                assert_eq!(ScalingAlgorithm::from_hint(h), a);
            }
        }
    }

    #[test]
    fn test_only_filters_iterate() {
        assert!(!ScalingAlgorithm::Nearest.iterates());
        assert!(ScalingAlgorithm::Bilinear.iterates());
        assert!(!ScalingAlgorithm::BoxSampled.iterates());
    }
}
