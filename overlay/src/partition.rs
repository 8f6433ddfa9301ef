//! Finding candidate pairs of segments by recursively partitioning space.
//!
//! Boxes are split at the midpoint of their common bounding box, alternating
//! between the x and y axes. Boxes entirely below the split and boxes entirely
//! above it can't overlap, so each half is handled recursively; boxes straddling
//! the split are compared directly with everything.

use std::collections::HashSet;

use crate::{
    geom::BoundingBox,
    num::Float,
    sections::Section,
    segments::Rings,
    turn::SegmentId,
};

const MAX_DEPTH: usize = 16;

struct Partitioner<'a, F: Float, V> {
    a: &'a [BoundingBox<F>],
    b: &'a [BoundingBox<F>],
    // In self mode, `a` and `b` are the same, and we only report each unordered pair once.
    same: bool,
    min_items: usize,
    visited: HashSet<(usize, usize)>,
    visit: V,
}

struct Divided {
    lower: Vec<usize>,
    upper: Vec<usize>,
    exceeding: Vec<usize>,
}

fn divide<F: Float>(boxes: &[BoundingBox<F>], items: &[usize], dim: usize, mid: &F) -> Divided {
    let mut ret = Divided {
        lower: Vec::new(),
        upper: Vec::new(),
        exceeding: Vec::new(),
    };
    for &i in items {
        let (lo, hi) = boxes[i].range(dim);
        if hi < mid {
            ret.lower.push(i);
        } else if lo > mid {
            ret.upper.push(i);
        } else {
            ret.exceeding.push(i);
        }
    }
    ret
}

fn union_box<'a, F: Float>(
    boxes: impl IntoIterator<Item = &'a BoundingBox<F>>,
) -> Option<BoundingBox<F>> {
    let mut boxes = boxes.into_iter();
    let mut ret = boxes.next()?.clone();
    for b in boxes {
        ret.expand(b);
    }
    Some(ret)
}

fn midpoint<F: Float>((lo, hi): (&F, &F)) -> F {
    (lo.clone() + hi) / F::from_f32(2.0)
}

impl<F: Float, V: FnMut(usize, usize)> Partitioner<'_, F, V> {
    fn report(&mut self, i: usize, j: usize) {
        if self.same && i == j {
            return;
        }
        if !self.a[i].intersects(&self.b[j]) {
            return;
        }
        let key = if self.same { (i.min(j), i.max(j)) } else { (i, j) };
        if self.visited.insert(key) {
            (self.visit)(key.0, key.1);
        }
    }

    fn brute(&mut self, xs: &[usize], ys: &[usize]) {
        for &i in xs {
            for &j in ys {
                self.report(i, j);
            }
        }
    }

    fn recurse_self(&mut self, items: Vec<usize>, dim: usize, depth: usize) {
        if items.len() < self.min_items || depth >= MAX_DEPTH {
            self.brute(&items, &items);
            return;
        }
        let Some(bbox) = union_box(items.iter().map(|&i| &self.a[i])) else {
            return;
        };
        let mid = midpoint(bbox.range(dim));
        let Divided {
            lower,
            upper,
            exceeding,
        } = divide(self.a, &items, dim, &mid);

        self.brute(&exceeding, &exceeding);
        self.brute(&exceeding, &lower);
        self.brute(&exceeding, &upper);
        self.recurse_self(lower, 1 - dim, depth + 1);
        self.recurse_self(upper, 1 - dim, depth + 1);
    }

    fn recurse_pair(&mut self, xs: Vec<usize>, ys: Vec<usize>, dim: usize, depth: usize) {
        if xs.is_empty() || ys.is_empty() {
            return;
        }
        if xs.len() + ys.len() < self.min_items || depth >= MAX_DEPTH {
            self.brute(&xs, &ys);
            return;
        }
        let Some(bbox) = union_box(
            xs.iter()
                .map(|&i| &self.a[i])
                .chain(ys.iter().map(|&j| &self.b[j])),
        ) else {
            return;
        };
        let mid = midpoint(bbox.range(dim));
        let x = divide(self.a, &xs, dim, &mid);
        let y = divide(self.b, &ys, dim, &mid);

        self.brute(&x.exceeding, &ys);
        self.brute(&x.lower, &y.exceeding);
        self.brute(&x.upper, &y.exceeding);
        self.recurse_pair(x.lower, y.lower, 1 - dim, depth + 1);
        self.recurse_pair(x.upper, y.upper, 1 - dim, depth + 1);
    }
}

/// Calls `visit(i, j)`, with `i < j`, exactly once for every pair of
/// overlapping boxes.
pub fn partition_self<F: Float>(
    boxes: &[BoundingBox<F>],
    min_items: usize,
    visit: impl FnMut(usize, usize),
) {
    let mut p = Partitioner {
        a: boxes,
        b: boxes,
        same: true,
        min_items,
        visited: HashSet::new(),
        visit,
    };
    p.recurse_self((0..boxes.len()).collect(), 0, 0);
}

/// Calls `visit(i, j)` exactly once for every box `a[i]` overlapping a box `b[j]`.
pub fn partition<F: Float>(
    a: &[BoundingBox<F>],
    b: &[BoundingBox<F>],
    min_items: usize,
    visit: impl FnMut(usize, usize),
) {
    let mut p = Partitioner {
        a,
        b,
        same: false,
        min_items,
        visited: HashSet::new(),
        visit,
    };
    p.recurse_pair((0..a.len()).collect(), (0..b.len()).collect(), 0, 0);
}

fn adjacent(i: usize, j: usize, num_segments: usize, closed: bool) -> bool {
    i + 1 == j
        || j + 1 == i
        || (closed && num_segments > 1 && ((i == 0 && j + 1 == num_segments) || (j == 0 && i + 1 == num_segments)))
}

/// Finds every pair of segments whose bounding boxes overlap.
///
/// Neighboring segments of the same ring are skipped. If `self_pairs` is false,
/// only pairs from different sources are reported. The first segment of each
/// pair has the smaller id.
pub fn segment_pairs<F: Float>(
    rings: &Rings<F>,
    sections: &[Section<F>],
    min_items: usize,
    self_pairs: bool,
    mut visit: impl FnMut(SegmentId, SegmentId),
) {
    let mut visit_sections = |s: &Section<F>, t: &Section<F>| {
        if !self_pairs && s.source == t.source {
            return;
        }
        let ring_s = rings.get(s.ring);
        let ring_t = rings.get(t.ring);
        for i in s.segments.clone() {
            let seg_i = ring_s.segment(i);
            let box_i = seg_i.bounding_box();
            for j in t.segments.clone() {
                if s.ring == t.ring
                    && (i == j || adjacent(i, j, ring_s.num_segments(), ring_s.is_closed()))
                {
                    continue;
                }
                if !box_i.intersects(&ring_t.segment(j).bounding_box()) {
                    continue;
                }
                let (a, b) = (ring_s.segment_id(i), ring_t.segment_id(j));
                if a < b {
                    visit(a, b);
                } else {
                    visit(b, a);
                }
            }
        }
    };

    if self_pairs {
        let boxes: Vec<_> = sections.iter().map(|s| s.bbox.clone()).collect();
        partition_self(&boxes, min_items, |i, j| {
            visit_sections(&sections[i], &sections[j])
        });
    } else {
        let (a, b): (Vec<&Section<F>>, Vec<&Section<F>>) =
            sections.iter().partition(|s| s.source == 0);
        let a_boxes: Vec<_> = a.iter().map(|s| s.bbox.clone()).collect();
        let b_boxes: Vec<_> = b.iter().map(|s| s.bbox.clone()).collect();
        partition(&a_boxes, &b_boxes, min_items, |i, j| visit_sections(a[i], b[j]));
    }
}

#[cfg(test)]
mod tests {
    use ordered_float::NotNan;
    use proptest::prelude::*;

    use super::*;
    use crate::geom::Point;

    type F = NotNan<f64>;

    fn bbox(x0: f64, y0: f64, x1: f64, y1: f64) -> BoundingBox<F> {
        BoundingBox::from_points([&Point::from_f64(x0, y0), &Point::from_f64(x1, y1)])
    }

    fn brute_force(boxes: &[BoundingBox<F>]) -> Vec<(usize, usize)> {
        let mut ret = Vec::new();
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                if boxes[i].intersects(&boxes[j]) {
                    ret.push((i, j));
                }
            }
        }
        ret
    }

    #[test]
    fn touching_boxes_are_found() {
        let boxes = vec![
            bbox(0.0, 0.0, 1.0, 1.0),
            bbox(1.0, 1.0, 2.0, 2.0),
            bbox(5.0, 5.0, 6.0, 6.0),
        ];
        let mut found = Vec::new();
        partition_self(&boxes, 1, |i, j| found.push((i, j)));
        assert_eq!(found, vec![(0, 1)]);
    }

    proptest! {
        #[test]
        fn matches_brute_force(coords in prop::collection::vec((0..50i32, 0..50i32, 0..10i32, 0..10i32), 0..60)) {
            let boxes: Vec<_> = coords
                .iter()
                .map(|&(x, y, w, h)| bbox(x.into(), y.into(), (x + w).into(), (y + h).into()))
                .collect();
            let mut found = Vec::new();
            partition_self(&boxes, 4, |i, j| found.push((i, j)));
            found.sort();
            prop_assert_eq!(found, brute_force(&boxes));

            let (a, b) = boxes.split_at(boxes.len() / 2);
            let mut found = Vec::new();
            partition(a, b, 4, |i, j| found.push((i, j)));
            found.sort();
            let mut expected = Vec::new();
            for (i, x) in a.iter().enumerate() {
                for (j, y) in b.iter().enumerate() {
                    if x.intersects(y) {
                        expected.push((i, j));
                    }
                }
            }
            prop_assert_eq!(found, expected);
        }
    }
}
