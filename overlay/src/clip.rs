//! Clipping linestrings against areas.

use crate::{
    geometry::{Geometry, Linestring, MultiLinestring},
    num::Float,
    relate::{split_ring, Prepared},
    winding::Location,
    Error,
};

/// Which parts of the linestrings to keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LinearClip {
    /// The parts inside the area, including the parts along its boundary.
    Inside,
    /// The parts outside the area.
    Outside,
}

impl LinearClip {
    fn keeps(self, location: Location) -> bool {
        match self {
            LinearClip::Inside => location != Location::Exterior,
            LinearClip::Outside => location == Location::Exterior,
        }
    }
}

/// Intersects (with [`LinearClip::Inside`]) or subtracts (with
/// [`LinearClip::Outside`]) an areal geometry from some linestrings.
///
/// The linestrings are cut where they cross or touch the boundary of the
/// area, and the pieces we keep are joined back up where they meet.
pub fn clip_linear<F: Float>(
    lines: &MultiLinestring<F>,
    areal: &Geometry<F>,
    clip: LinearClip,
) -> Result<MultiLinestring<F>, Error> {
    if areal.to_multi_polygon().is_none() {
        return Err(Error::NotAreal {
            kind: areal.kind(),
        });
    }
    let prep = Prepared::new(&Geometry::MultiLinestring(lines.clone()), areal)?;
    let turn_points = prep.turn_points();

    let mut out = Vec::new();
    for (idx, ring) in prep.rings.iter() {
        if ring.id.source != 0 {
            continue;
        }
        let mut current: Option<(Vec<_>, _)> = None;
        for piece in split_ring(idx, ring, &turn_points[idx.0], &prep.special) {
            let location = prep.locate(1, &piece.sample);
            if !clip.keeps(location) {
                if let Some((points, _)) = current.take() {
                    out.push(Linestring::new(points));
                }
                continue;
            }
            match &mut current {
                Some((points, to)) if *to == piece.from => {
                    points.extend(piece.points.into_iter().skip(1));
                    *to = piece.to;
                }
                _ => {
                    if let Some((points, _)) = current.take() {
                        out.push(Linestring::new(points));
                    }
                    current = Some((piece.points, piece.to));
                }
            }
        }
        if let Some((points, _)) = current {
            out.push(Linestring::new(points));
        }
    }
    log::trace!("clipped {} linestrings into {}", lines.0.len(), out.len());
    Ok(MultiLinestring(out))
}
