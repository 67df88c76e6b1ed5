use serde::{Deserialize, Serialize};

/// Direction a range shift moves a pixel along its ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftDirection {
    /// Towards the end of the ramp.
    Up,
    /// Towards the start of the ramp.
    Down,
}

/// Ordered list of palette indices, e.g. a light to dark shading run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ramp {
    indices: Vec<u8>,
}

impl Ramp {
    pub fn new(indices: Vec<u8>) -> Self {
        Self { indices }
    }

    /// Ramp over the contiguous palette range `first..=last`.
    pub fn span(first: u8, last: u8) -> Self {
        if first <= last {
            Self::new((first..=last).collect())
        } else {
            Self::new((last..=first).rev().collect())
        }
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: u8) -> bool {
        self.indices.contains(&index)
    }

    /// Neighbour of `index` in `direction`. `None` if `index` isn't part of the
    /// ramp or already sits at that end.
    pub fn shift(&self, index: u8, direction: ShiftDirection) -> Option<u8> {
        let pos = self.indices.iter().position(|&i| i == index)?;
        let next = match direction {
            ShiftDirection::Up => pos + 1,
            ShiftDirection::Down => pos.checked_sub(1)?,
        };
        self.indices.get(next).copied()
    }

    /// Shift table for all 256 indices; entries outside the ramp map to themselves.
    pub(crate) fn lookup_table(&self, direction: ShiftDirection) -> [u8; 256] {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = self.shift(i as u8, direction).unwrap_or(i as u8);
        }
        table
    }
}
