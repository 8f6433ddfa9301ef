use serde::{Deserialize, Serialize};

use crate::num::Float;

/// The winding direction of exterior rings.
///
/// Interior rings always run the other way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Clockwise,
    CounterClockwise,
}

/// How close two turns must be to be merged into a cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tolerance {
    /// Only identical points are merged.
    Exact,
    /// Points within this many units of relative error are merged, relative to
    /// the largest coordinate of the inputs.
    Ulps(u32),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Ulps(64)
    }
}

/// Parameters for an overlay.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// The orientation of output exteriors.
    pub orientation: Orientation,
    pub tolerance: Tolerance,
    /// The maximum number of segments in a section.
    pub max_section_size: usize,
    /// Below this many sections, the partition compares everything with everything.
    pub partition_min_items: usize,
    /// Remove spikes from the inputs before intersecting them.
    pub remove_spikes: bool,
    /// Look for turns between rings of the same geometry.
    pub self_turns: bool,
    /// Log every turn at `trace` level after every phase.
    pub trace_turns: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            orientation: Orientation::default(),
            tolerance: Tolerance::default(),
            max_section_size: 10,
            partition_min_items: 16,
            remove_spikes: true,
            self_turns: true,
            trace_turns: false,
        }
    }
}

impl OverlayConfig {
    /// The clustering tolerance for inputs whose largest absolute coordinate is `magnitude`.
    pub(crate) fn cluster_tolerance<F: Float>(&self, magnitude: &F) -> F {
        match self.tolerance {
            Tolerance::Exact => F::from_f32(0.0),
            Tolerance::Ulps(ulps) => F::tolerance(magnitude, ulps),
        }
    }

    /// Output rings enclosing no more than this are dropped: they're no wider
    /// than the clustering tolerance, over the whole extent of the inputs.
    pub(crate) fn min_area<F: Float>(&self, magnitude: &F) -> F {
        self.cluster_tolerance(magnitude) * magnitude
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_ron_snapshot;
    use ordered_float::NotNan;

    use super::*;

    #[test]
    fn defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.tolerance, Tolerance::Ulps(64));
        assert_eq!(config.max_section_size, 10);
        assert_ron_snapshot!(config.orientation, @"Clockwise");
    }

    #[test]
    fn exact_tolerance_is_zero() {
        let config = OverlayConfig {
            tolerance: Tolerance::Exact,
            ..OverlayConfig::default()
        };
        let big = NotNan::new(1e9).unwrap();
        assert_eq!(config.cluster_tolerance(&big).into_inner(), 0.0);
        assert!(OverlayConfig::default().cluster_tolerance(&big).into_inner() > 0.0);
        assert_eq!(config.min_area(&big).into_inner(), 0.0);
    }

    #[test]
    fn min_area_scales_with_the_square_of_magnitude() {
        let config = OverlayConfig::default();
        let small = config.min_area(&NotNan::new(1.0f64).unwrap()).into_inner();
        let big = config.min_area(&NotNan::new(1000.0f64).unwrap()).into_inner();
        assert!(small > 0.0 && small < 1e-10);
        assert!((big / small - 1e6).abs() < 1.0);
    }
}
