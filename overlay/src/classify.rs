//! Turning segment intersections into turns.
//!
//! For every pair of segments that meet, we emit a turn for each point they
//! share, saying what each ring does as it leaves that point relative to the
//! other ring. Directions are compared exactly.

use crate::{
    config::OverlayConfig,
    error::ClassificationError,
    exact::{self, cmp_clockwise, same_direction},
    geom::{BoundingBox, Point, Segment},
    intersection::{
        ratio_along, segment_intersection, IntersectionPoint, OnSegment, SegmentIntersection,
        SegmentRatio,
    },
    num::Float,
    partition::segment_pairs,
    sections::sectionalize,
    segments::{PreparedRing, RingKind, Rings},
    strategy::{Side, Strategy},
    turn::{Method, Operation, Position, SegmentId, Turn, TurnOperation},
};

/// A segment, together with what the classifier needs to know about its ring.
#[derive(Clone, Debug)]
pub struct SegmentContext<'a, F: Float> {
    pub seg_id: SegmentId,
    pub segment: Segment<F>,
    /// The point before the start of the segment, if the ring has one.
    pub prev: Option<&'a Point<F>>,
    pub kind: RingKind,
    /// Is this the first segment of an open linestring?
    pub is_first: bool,
    /// Is this the last segment of an open linestring?
    pub is_last: bool,
}

impl<'a, F: Float> SegmentContext<'a, F> {
    pub fn new(ring: &'a PreparedRing<F>, segment: usize) -> Self {
        let linear = ring.kind == RingKind::Linear;
        SegmentContext {
            seg_id: ring.segment_id(segment),
            segment: ring.segment(segment),
            prev: ring.prev_point(segment),
            kind: ring.kind,
            is_first: linear && segment == 0,
            is_last: linear && segment + 1 == ring.num_segments(),
        }
    }

    fn position(&self, at: OnSegment) -> Position {
        match at {
            OnSegment::Start if self.is_first => Position::Front,
            OnSegment::End if self.is_last => Position::Back,
            _ => Position::Middle,
        }
    }

    /// Points at the end of a segment are reported by the next segment, except
    /// at the back of a linestring, where there is no next segment.
    fn emits(&self, at: OnSegment) -> bool {
        at != OnSegment::End || self.is_last
    }

    /// The directions back along the ring and forward along the ring, leaving
    /// the turn point.
    fn directions(
        &self,
        at: OnSegment,
    ) -> Result<(Option<exact::Vector>, Option<exact::Vector>), ClassificationError> {
        let start = exact::Point::from_point(&self.segment.start);
        let end = exact::Point::from_point(&self.segment.end);
        let along = &end - &start;
        Ok(match at {
            OnSegment::Start => {
                let back = match self.prev {
                    Some(prev) => {
                        let back = &exact::Point::from_point(prev) - &start;
                        if back.is_zero() {
                            return Err(ClassificationError::UndefinedDirection {
                                seg_id: self.seg_id,
                            });
                        }
                        Some(back)
                    }
                    None => None,
                };
                (back, Some(along))
            }
            OnSegment::Interior => (Some(along.reversed()), Some(along)),
            OnSegment::End => (Some(along.reversed()), None),
        })
    }
}

/// Options for the classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnPolicy {
    /// Emit a `Method::None` turn where a zero-length segment touches another
    /// segment, instead of ignoring it.
    pub include_degenerate: bool,
}

/// What a ring looks like at a turn point.
struct Local<'c, 'a, F: Float> {
    ctx: &'c SegmentContext<'a, F>,
    back: Option<exact::Vector>,
    fwd: Option<exact::Vector>,
}

impl<F: Float> Local<'_, '_, F> {
    fn is_spike(&self) -> bool {
        match (&self.back, &self.fwd) {
            (Some(back), Some(fwd)) => {
                matches!(self.ctx.kind, RingKind::Areal { .. }) && same_direction(back, fwd)
            }
            _ => false,
        }
    }
}

/// What ring `i` does, leaving the turn, relative to ring `j`.
fn operation<F: Float>(i: &Local<F>, j: &Local<F>) -> Operation {
    let Some(fwd_i) = &i.fwd else {
        return Operation::None;
    };
    let along = |dir: &Option<exact::Vector>| dir.as_ref().is_some_and(|d| same_direction(fwd_i, d));
    if along(&j.fwd) {
        return Operation::Continue;
    }
    if along(&j.back) {
        return Operation::Blocked;
    }
    match (j.ctx.kind, &j.back, &j.fwd) {
        (RingKind::Areal { interior_on_right }, Some(back_j), Some(fwd_j)) => {
            // Going clockwise from the outgoing direction of j, we sweep the right
            // side of j until we reach its incoming direction.
            let inside_right =
                cmp_clockwise(fwd_j, fwd_i, back_j) == std::cmp::Ordering::Less;
            if inside_right == interior_on_right {
                Operation::Intersection
            } else {
                Operation::Union
            }
        }
        _ => Operation::None,
    }
}

fn turn_operation<F: Float>(
    ctx: &SegmentContext<F>,
    fraction: SegmentRatio<F>,
    at: OnSegment,
    operation: Operation,
    is_collinear: bool,
) -> TurnOperation<F> {
    let mut op = TurnOperation::new(ctx.seg_id, fraction, operation);
    op.position = ctx.position(at);
    op.is_collinear = is_collinear;
    op
}

fn method(ip: &IntersectionPoint<impl Float>) -> Method {
    match (ip.at_a, ip.at_b) {
        (OnSegment::Interior, OnSegment::Interior) => Method::Cross,
        (OnSegment::Interior, _) | (_, OnSegment::Interior) => Method::TouchInterior,
        _ => Method::Touch,
    }
}

fn emit<F: Float>(
    p: &SegmentContext<F>,
    q: &SegmentContext<F>,
    ip: IntersectionPoint<F>,
    method: Method,
    is_collinear: bool,
    out: &mut Vec<Turn<F>>,
) -> Result<(), ClassificationError> {
    if !p.emits(ip.at_a) || !q.emits(ip.at_b) {
        return Ok(());
    }
    let (back, fwd) = p.directions(ip.at_a)?;
    let local_p = Local { ctx: p, back, fwd };
    let (back, fwd) = q.directions(ip.at_b)?;
    let local_q = Local { ctx: q, back, fwd };

    let ops = |op_p, op_q| {
        [
            turn_operation(p, ip.ra.clone(), ip.at_a, op_p, is_collinear),
            turn_operation(q, ip.rb.clone(), ip.at_b, op_q, is_collinear),
        ]
    };

    if local_p.is_spike() || local_q.is_spike() {
        // One turn that blocks the spiked ring, and one that runs along it.
        let (op_p, op_q) = if local_p.is_spike() {
            (Operation::Blocked, Operation::Union)
        } else {
            (Operation::Union, Operation::Blocked)
        };
        out.push(Turn::new(ip.point.clone(), method, ops(op_p, op_q)));
        out.push(Turn::new(
            ip.point.clone(),
            method,
            ops(Operation::Continue, Operation::Continue),
        ));
        return Ok(());
    }

    let op_p = operation(&local_p, &local_q);
    let op_q = operation(&local_q, &local_p);
    out.push(Turn::new(ip.point.clone(), method, ops(op_p, op_q)));
    Ok(())
}

/// Finds the turns between two segments.
pub fn classify<F: Float>(
    p: &SegmentContext<F>,
    q: &SegmentContext<F>,
    strategy: &dyn Strategy<F>,
    policy: TurnPolicy,
) -> Result<Vec<Turn<F>>, ClassificationError> {
    let mut out = Vec::new();
    match segment_intersection(strategy, &p.segment, &q.segment) {
        SegmentIntersection::Disjoint => {}
        SegmentIntersection::Degenerate => {
            if policy.include_degenerate {
                degenerate_turn(p, q, strategy, &mut out);
            }
        }
        SegmentIntersection::Single(ip) => {
            let m = method(&ip);
            emit(p, q, ip, m, false, &mut out)?;
        }
        SegmentIntersection::Collinear { points, .. } => {
            let m = if points.len() == 1 {
                Method::Touch
            } else if p.segment == q.segment || p.segment == q.segment.reversed() {
                Method::Equal
            } else {
                Method::Collinear
            };
            for ip in points {
                emit(p, q, ip, m, true, &mut out)?;
            }
        }
    }
    Ok(out)
}

fn degenerate_turn<F: Float>(
    p: &SegmentContext<F>,
    q: &SegmentContext<F>,
    strategy: &dyn Strategy<F>,
    out: &mut Vec<Turn<F>>,
) {
    let (point, other) = if p.segment.is_degenerate() {
        (&p.segment.start, &q.segment)
    } else {
        (&q.segment.start, &p.segment)
    };
    let on_other = other.is_degenerate()
        || (strategy.side(&other.start, &other.end, point) == Side::Collinear
            && other
                .bounding_box()
                .contains(&BoundingBox::from_points([point])));
    if !on_other {
        return;
    }
    let ops = [p, q].map(|ctx| {
        let fraction = if ctx.segment.is_degenerate() {
            SegmentRatio::zero()
        } else {
            ratio_along(&ctx.segment, point)
        };
        TurnOperation::new(ctx.seg_id, fraction, Operation::None)
    });
    out.push(Turn::new(point.clone(), Method::None, ops));
}

/// Finds every turn between the rings, in a deterministic order.
///
/// If `self_pairs` is false, only turns between the two sources are found.
pub fn find_turns<F: Float>(
    rings: &Rings<F>,
    config: &OverlayConfig,
    strategy: &dyn Strategy<F>,
    self_pairs: bool,
    policy: TurnPolicy,
) -> Result<Vec<Turn<F>>, ClassificationError> {
    let sections = sectionalize(rings, config.max_section_size);
    let mut turns = Vec::new();
    let mut error = None;
    segment_pairs(rings, &sections, config.partition_min_items, self_pairs, |a, b| {
        if error.is_some() {
            return;
        }
        let p = SegmentContext::new(rings.get(rings.ring_of(a)), a.segment);
        let q = SegmentContext::new(rings.get(rings.ring_of(b)), b.segment);
        match classify(&p, &q, strategy, policy) {
            Ok(new_turns) => turns.extend(new_turns),
            Err(e) => error = Some(e),
        }
    });
    if let Some(e) = error {
        return Err(e);
    }
    turns.sort_by(|s, t| {
        let key = |t: &Turn<F>| {
            (
                t.operations[0].seg_id,
                t.operations[1].seg_id,
                t.operations[0].fraction.clone(),
            )
        };
        key(s).cmp(&key(t))
    });
    log::debug!(
        "{} sections, {} turns ({} from self-intersections)",
        sections.len(),
        turns.len(),
        turns.iter().filter(|t| t.is_self_turn()).count()
    );
    Ok(turns)
}
