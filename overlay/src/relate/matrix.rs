//! DE-9IM matrices and the masks that match them.

use std::{fmt, str::FromStr};

use crate::{winding::Location, Error};

/// The dimension of an intersection: empty, or made of points, curves, or areas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum Dimension {
    Empty,
    Point,
    Curve,
    Area,
}

impl Dimension {
    pub fn to_char(self) -> char {
        match self {
            Dimension::Empty => 'F',
            Dimension::Point => '0',
            Dimension::Curve => '1',
            Dimension::Area => '2',
        }
    }
}

fn index(a: Location, b: Location) -> usize {
    let row = |loc| match loc {
        Location::Interior => 0,
        Location::Boundary => 1,
        Location::Exterior => 2,
    };
    row(a) * 3 + row(b)
}

/// A DE-9IM intersection matrix.
///
/// Rows are the interior, boundary, and exterior of the first geometry;
/// columns are those of the second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Matrix {
    cells: [Dimension; 9],
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix {
            cells: [Dimension::Empty; 9],
        }
    }
}

impl Matrix {
    pub fn get(&self, a: Location, b: Location) -> Dimension {
        self.cells[index(a, b)]
    }

    /// Raises a cell to at least `dim`. Returns true if it changed.
    pub fn set_at_least(&mut self, a: Location, b: Location, dim: Dimension) -> bool {
        let cell = &mut self.cells[index(a, b)];
        if *cell < dim {
            *cell = dim;
            true
        } else {
            false
        }
    }

    /// The matrix with the roles of the two geometries swapped.
    pub fn transpose(&self) -> Matrix {
        let mut cells = [Dimension::Empty; 9];
        for i in 0..3 {
            for j in 0..3 {
                cells[j * 3 + i] = self.cells[i * 3 + j];
            }
        }
        Matrix { cells }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell.to_char())?;
        }
        Ok(())
    }
}

impl serde::Serialize for Matrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum MaskCell {
    /// `*`
    Any,
    /// `T`: anything but empty.
    NonEmpty,
    /// `F`
    Empty,
    /// `0`, `1`, or `2`
    Exactly(Dimension),
}

impl MaskCell {
    fn matches(self, dim: Dimension) -> bool {
        match self {
            MaskCell::Any => true,
            MaskCell::NonEmpty => dim != Dimension::Empty,
            MaskCell::Empty => dim == Dimension::Empty,
            MaskCell::Exactly(d) => dim == d,
        }
    }

    /// Can a cell that's currently `dim` still grow into a match?
    fn can_match(self, dim: Dimension) -> bool {
        match self {
            MaskCell::Any | MaskCell::NonEmpty => true,
            MaskCell::Empty => dim == Dimension::Empty,
            MaskCell::Exactly(d) => dim <= d,
        }
    }
}

/// A pattern for DE-9IM matrices, like `T*F**F***`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mask {
    cells: [MaskCell; 9],
}

impl Mask {
    pub fn matches(&self, matrix: &Matrix) -> bool {
        self.cells
            .iter()
            .zip(&matrix.cells)
            .all(|(mask, dim)| mask.matches(*dim))
    }

    /// Could `matrix` still match, if some of its cells grew?
    pub fn can_match(&self, matrix: &Matrix) -> bool {
        self.cells
            .iter()
            .zip(&matrix.cells)
            .all(|(mask, dim)| mask.can_match(*dim))
    }
}

impl FromStr for Mask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = |reason| Error::InvalidMask {
            mask: s.to_owned(),
            reason,
        };
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 9 {
            return Err(invalid("a mask has 9 characters"));
        }
        let mut cells = [MaskCell::Any; 9];
        for (cell, c) in cells.iter_mut().zip(chars) {
            *cell = match c.to_ascii_uppercase() {
                '*' => MaskCell::Any,
                'T' => MaskCell::NonEmpty,
                'F' => MaskCell::Empty,
                '0' => MaskCell::Exactly(Dimension::Point),
                '1' => MaskCell::Exactly(Dimension::Curve),
                '2' => MaskCell::Exactly(Dimension::Area),
                _ => return Err(invalid("mask characters are T, F, *, 0, 1, and 2")),
            };
        }
        Ok(Mask { cells })
    }
}

/// Some masks, at least one of which should match.
///
/// Written as masks separated by `|`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Masks(pub Vec<Mask>);

impl Masks {
    pub fn matches(&self, matrix: &Matrix) -> bool {
        self.0.iter().any(|m| m.matches(matrix))
    }

    pub fn can_match(&self, matrix: &Matrix) -> bool {
        self.0.iter().any(|m| m.can_match(matrix))
    }
}

impl FromStr for Masks {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        s.split('|')
            .map(|m| m.trim().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Masks)
    }
}

/// Builds up a matrix, giving up as soon as it can't match the masks any more.
#[derive(Clone, Debug)]
pub(crate) struct Accumulator<'m> {
    pub matrix: Matrix,
    masks: Option<&'m Masks>,
    pub interrupted: bool,
}

impl<'m> Accumulator<'m> {
    pub fn new(masks: Option<&'m Masks>) -> Self {
        Accumulator {
            matrix: Matrix::default(),
            masks,
            interrupted: false,
        }
    }

    pub fn update(&mut self, a: Location, b: Location, dim: Dimension) {
        if self.matrix.set_at_least(a, b, dim) {
            if let Some(masks) = self.masks {
                if !masks.can_match(&self.matrix) {
                    log::debug!("relate interrupted at {}", self.matrix);
                    self.interrupted = true;
                }
            }
        }
    }
}
