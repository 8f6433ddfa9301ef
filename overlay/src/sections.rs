//! Monotonic sections of rings.
//!
//! A section is a run of consecutive segments that all head in the same
//! quadrant. Its bounding box is cheap to compute and tight, which is what
//! the partition needs.

use std::ops::Range;

use crate::{
    geom::BoundingBox,
    num::Float,
    segments::{RingIdx, Rings},
};

#[derive(Clone, Debug)]
pub struct Section<F: Float> {
    pub ring: RingIdx,
    pub source: usize,
    /// The segment indices covered by this section.
    pub segments: Range<usize>,
    pub bbox: BoundingBox<F>,
}

fn direction_sign<F: Float>(from: &F, to: &F) -> i8 {
    match from.cmp(to) {
        std::cmp::Ordering::Less => 1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => -1,
    }
}

/// Splits every ring into sections of at most `max_size` segments.
pub fn sectionalize<F: Float>(rings: &Rings<F>, max_size: usize) -> Vec<Section<F>> {
    let max_size = max_size.max(1);
    let mut ret = Vec::new();
    for (idx, ring) in rings.iter() {
        let mut current: Option<(Section<F>, (i8, i8))> = None;
        for i in 0..ring.num_segments() {
            let seg = ring.segment(i);
            let dir = (
                direction_sign(&seg.start.x, &seg.end.x),
                direction_sign(&seg.start.y, &seg.end.y),
            );
            let extends = matches!(
                &current,
                Some((section, section_dir)) if *section_dir == dir && section.segments.len() < max_size
            );
            if extends {
                if let Some((section, _)) = current.as_mut() {
                    section.segments.end = i + 1;
                    section.bbox.expand_point(&seg.end);
                }
            } else {
                if let Some((section, _)) = current.take() {
                    ret.push(section);
                }
                current = Some((
                    Section {
                        ring: idx,
                        source: ring.id.source,
                        segments: i..(i + 1),
                        bbox: seg.bounding_box(),
                    },
                    dir,
                ));
            }
        }
        if let Some((section, _)) = current {
            ret.push(section);
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;

    use super::*;
    use crate::geometry::{MultiPolygon, Polygon};

    #[test]
    fn square_has_four_sections() {
        let mut rings = Rings::<NotNan<f64>>::default();
        let square = Polygon::from_coords(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)], &[]);
        rings.add_areal(0, &MultiPolygon(vec![square]), true);
        let sections = sectionalize(&rings, 10);
        assert_eq!(sections.len(), 4);
        assert!(sections.iter().all(|s| s.segments.len() == 1));
    }

    #[test]
    fn staircase_is_one_section_until_full() {
        let mut rings = Rings::<NotNan<f64>>::default();
        // Up and to the right in steps, then straight back down and left.
        let mut coords = Vec::new();
        for i in 0..6 {
            coords.push((i as f64, i as f64 * 2.0));
            coords.push((i as f64 + 0.5, i as f64 * 2.0 + 1.0));
        }
        coords.push((10.0, 0.0));
        rings.add_areal(0, &MultiPolygon(vec![Polygon::from_coords(&coords, &[])]), true);

        let sections = sectionalize(&rings, 4);
        assert_eq!(sections[0].segments, 0..4);
        assert_eq!(sections[1].segments, 4..8);
        let total: usize = sections.iter().map(|s| s.segments.len()).sum();
        assert_eq!(total, 13);
    }
}
