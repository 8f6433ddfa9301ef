//! The DE-9IM relation between two geometries, and the named predicates built on it.
//!
//! This shares the turn finding and clustering with the overlay. After that,
//! everything is decided by locating exact sample points: turn points and
//! endpoints for the 0-dimensional cells, a point inside every piece of every
//! ring and linestring for the 1-dimensional cells, and the two sides of every
//! ring piece for the 2-dimensional cells.

use std::collections::{HashMap, HashSet};

use crate::{
    classify::{find_turns, TurnPolicy},
    cluster::cluster_turns,
    config::OverlayConfig,
    enrich::sample_coverage,
    exact,
    geom::Point,
    geometry::Geometry,
    num::Float,
    segments::{RingKind, RingPosition, Rings},
    strategy::CARTESIAN,
    turn::Turn,
    winding::{locate_areal, Location},
    Error,
};

mod linear;
mod matrix;

pub(crate) use linear::split_ring;
pub use matrix::{Dimension, Mask, Masks, Matrix};

use linear::LinearWalker;
use matrix::Accumulator;

/// Everything we know about the two geometries being related.
pub(crate) struct Prepared<F: Float> {
    pub rings: Rings<F>,
    pub turns: Vec<Turn<F>>,
    /// For each source, its topological dimension.
    pub dims: [u8; 2],
    /// For each source of dimension 0, its points.
    points: [Vec<exact::Point>; 2],
    /// For each source of dimension 1, the boundary of its linestrings.
    boundaries: [HashSet<exact::Point>; 2],
    /// Every point where something happens: turns, endpoints, and points.
    pub special: HashSet<exact::Point>,
}

fn check_finite<F: Float>(g: &Geometry<F>) -> Result<(), Error> {
    if g.points().all(Point::is_finite) {
        Ok(())
    } else {
        Err(Error::Infinity)
    }
}

impl<F: Float> Prepared<F> {
    pub fn new(a: &Geometry<F>, b: &Geometry<F>) -> Result<Self, Error> {
        check_finite(a)?;
        check_finite(b)?;
        let config = OverlayConfig::default();
        let mut rings = Rings::default();
        let mut points: [Vec<exact::Point>; 2] = [Vec::new(), Vec::new()];
        for (source, g) in [a, b].into_iter().enumerate() {
            if let Some(mp) = g.to_multi_polygon() {
                rings.add_areal(source, &mp, config.remove_spikes);
            } else if let Some(lines) = g.to_multi_linestring() {
                rings.add_linear(source, &lines);
            } else {
                points[source] = g.points().map(exact::Point::from_point).collect();
            }
        }

        // Linestring boundaries follow the mod-2 rule.
        let mut boundaries: [HashSet<exact::Point>; 2] = [HashSet::new(), HashSet::new()];
        for (source, boundary) in boundaries.iter_mut().enumerate() {
            let mut counts: HashMap<exact::Point, usize> = HashMap::new();
            for (_, ring) in rings.iter() {
                if ring.id.source == source && ring.kind == RingKind::Linear {
                    for p in [ring.exact.first(), ring.exact.last()].into_iter().flatten() {
                        *counts.entry(p.clone()).or_default() += 1;
                    }
                }
            }
            boundary.extend(counts.into_iter().filter(|(_, c)| c % 2 == 1).map(|(p, _)| p));
        }

        let mut turns = find_turns(&rings, &config, &CARTESIAN, false, TurnPolicy::default())?;
        let nodes = cluster_turns(&mut turns, &rings, &F::from_f32(0.0));

        let mut special: HashSet<exact::Point> =
            nodes.points.iter().map(exact::Point::from_point).collect();
        for source in 0..2 {
            special.extend(points[source].iter().cloned());
            special.extend(boundaries[source].iter().cloned());
        }

        Ok(Prepared {
            rings,
            turns,
            dims: [a.dimension(), b.dimension()],
            points,
            boundaries,
            special,
        })
    }

    /// Locates an exact point relative to one of the two geometries.
    pub fn locate(&self, source: usize, p: &exact::Point) -> Location {
        match self.dims[source] {
            0 => {
                if self.points[source].contains(p) {
                    Location::Interior
                } else {
                    Location::Exterior
                }
            }
            1 => {
                if self.boundaries[source].contains(p) {
                    return Location::Boundary;
                }
                let on_line = self.rings.iter().any(|(_, ring)| {
                    ring.id.source == source
                        && ring.kind == RingKind::Linear
                        && ring.exact_segments().any(|s| s.contains(p))
                });
                if on_line {
                    Location::Interior
                } else {
                    Location::Exterior
                }
            }
            _ => locate_areal(&self.rings, source, p),
        }
    }

    /// For every ring, the points of the turns on it, keyed by position.
    pub fn turn_points(&self) -> Vec<HashMap<RingPosition, Point<F>>> {
        let mut ret = vec![HashMap::new(); self.rings.len()];
        for turn in &self.turns {
            for op in &turn.operations {
                let idx = self.rings.ring_of(op.seg_id);
                let pos = self.rings.get(idx).position(op.seg_id.segment, &op.fraction);
                ret[idx.0].insert(pos, turn.point.clone());
            }
        }
        ret
    }
}

fn side(covered: bool) -> Location {
    if covered {
        Location::Interior
    } else {
        Location::Exterior
    }
}

fn relate_with<F: Float>(
    a: &Geometry<F>,
    b: &Geometry<F>,
    masks: Option<&Masks>,
) -> Result<(Matrix, bool), Error> {
    let prep = Prepared::new(a, b)?;
    let mut acc = Accumulator::new(masks);
    acc.update(Location::Exterior, Location::Exterior, Dimension::Area);

    // The ends of linestrings are recorded by their walkers.
    let is_end = |p: &exact::Point| prep.boundaries.iter().any(|b| b.contains(p));
    for p in prep.special.iter().filter(|p| !is_end(p)) {
        acc.update(prep.locate(0, p), prep.locate(1, p), Dimension::Point);
        if acc.interrupted {
            return Ok((acc.matrix, false));
        }
    }

    let turn_points = prep.turn_points();
    for (idx, ring) in prep.rings.iter() {
        let source = ring.id.source;
        let other = 1 - source;
        let mut walker = (!ring.is_closed()).then(|| LinearWalker::new(source));
        for piece in split_ring(idx, ring, &turn_points[idx.0], &prep.special) {
            match &mut walker {
                Some(walker) => walker.step(prep.locate(other, &piece.sample), &mut acc),
                None => {
                    let own = prep.locate(source, &piece.sample);
                    let other = prep.locate(other, &piece.sample);
                    let (a, b) = if source == 0 { (own, other) } else { (other, own) };
                    acc.update(a, b, Dimension::Curve);
                    match sample_coverage(&prep.rings, ring, &piece.ranges) {
                        Some((left, right)) => {
                            for c in [left, right] {
                                acc.update(side(c[0] > 0), side(c[1] > 0), Dimension::Area);
                            }
                        }
                        None => log::warn!("couldn't sample the sides of a piece of {idx:?}"),
                    }
                }
            }
            if acc.interrupted {
                return Ok((acc.matrix, false));
            }
        }
        if let Some(walker) = walker {
            let ends = [ring.exact.first(), ring.exact.last()]
                .map(|p| p.map(|p| (prep.locate(source, p), prep.locate(other, p))));
            if let [Some(front), Some(back)] = ends {
                walker.finish([front, back], &mut acc);
            }
            log::trace!(
                "linestring {:?} entered the other geometry {} times",
                ring.id,
                walker.entries
            );
            if acc.interrupted {
                return Ok((acc.matrix, false));
            }
        }
    }

    let matched = masks.map_or(true, |m| m.matches(&acc.matrix));
    Ok((acc.matrix, matched))
}

/// Computes the DE-9IM matrix of two geometries.
pub fn relate<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<Matrix, Error> {
    relate_with(a, b, None).map(|(m, _)| m)
}

/// Does the relation between two geometries match a mask (or one of several,
/// separated by `|`)?
///
/// This stops early once the answer is known to be no.
pub fn relate_mask<F: Float>(a: &Geometry<F>, b: &Geometry<F>, mask: &str) -> Result<bool, Error> {
    let masks: Masks = mask.parse()?;
    relate_with(a, b, Some(&masks)).map(|(_, matched)| matched)
}

pub fn equals<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "T*F**FFF*")
}

pub fn disjoint<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "FF*FF****")
}

pub fn intersects<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    disjoint(a, b).map(|d| !d)
}

pub fn touches<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "FT*******|F**T*****|F***T****")
}

pub fn within<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "T*F**F***")
}

pub fn contains<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "T*****FF*")
}

pub fn covers<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "T*****FF*|*T****FF*|***T**FF*|****T*FF*")
}

pub fn covered_by<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    relate_mask(a, b, "T*F**F***|*TF**F***|**FT*F***|**F*TF***")
}

/// Do the geometries cross? This is only defined for some combinations of
/// dimensions, and is false for the rest.
pub fn crosses<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    let mask = match (a.dimension(), b.dimension()) {
        (0, 1) | (0, 2) | (1, 2) => "T*T******",
        (1, 0) | (2, 0) | (2, 1) => "T*****T**",
        (1, 1) => "0********",
        _ => return Ok(false),
    };
    relate_mask(a, b, mask)
}

/// Do the geometries overlap? Only geometries of the same dimension can.
pub fn overlaps<F: Float>(a: &Geometry<F>, b: &Geometry<F>) -> Result<bool, Error> {
    let mask = match (a.dimension(), b.dimension()) {
        (0, 0) | (2, 2) => "T*T***T**",
        (1, 1) => "1*T***T**",
        _ => return Ok(false),
    };
    relate_mask(a, b, mask)
}
