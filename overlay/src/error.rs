use crate::turn::SegmentId;

/// Everything that can go wrong in an overlay or relate computation.
///
/// Messy geometry (self-intersections, spikes, rings that fail to close) is not
/// an error: it is repaired or dropped along the way, and logged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("input coordinate is infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("input coordinate is not a number")]
    NaN,
    /// The geometry has no area, so it can't take part in an areal overlay.
    #[error("a {kind} cannot take part in an areal overlay")]
    NotAreal {
        /// The kind of geometry that was passed.
        kind: &'static str,
    },
    /// A DE-9IM mask could not be parsed.
    #[error("invalid DE-9IM mask {mask:?}: {reason}")]
    InvalidMask {
        /// The offending mask.
        mask: String,
        /// What was wrong with it.
        reason: &'static str,
    },
    /// The turn classifier hit a configuration it can't describe.
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

/// A contradiction reaching the turn classifier.
///
/// These point at a broken input contract (for example, repeated points that
/// should have been removed) or at a bug in the predicates. They are never
/// recovered from.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    /// A neighboring point coincides with the turn point, so the direction of
    /// the ring at the turn is undefined.
    #[error("segment {seg_id:?} has no direction at its turn point")]
    UndefinedDirection {
        /// The segment whose direction was needed.
        seg_id: SegmentId,
    },
}
