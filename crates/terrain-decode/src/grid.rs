//! Column-major to row-major reordering.

use crate::error::{DecodeError, DecodeResult};

/// Terrain size in nodes, `x` by `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub x: usize,
    pub y: usize,
}

impl GridDims {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.x * self.y
    }

    /// Require dimensions to be present and to cover exactly `node_count`
    /// nodes.
    pub fn require(
        grid: Option<Self>,
        node_count: usize,
        missing: &'static str,
    ) -> DecodeResult<Self> {
        let grid = grid.ok_or(DecodeError::MissingMetadata(missing))?;
        if grid.x.checked_mul(grid.y) != Some(node_count) {
            return Err(DecodeError::GridMismatch {
                height: grid.x,
                width: grid.y,
                len: node_count,
            });
        }
        Ok(grid)
    }
}

/// Reorder `flat`, addressed as `flat[col * height + row]`, into row-major
/// order `out[row * width + col]`.
///
/// Used for whole node grids and for the pixels inside a single node image.
/// Applying it twice with the dimensions swapped restores the input.
pub fn transpose<T>(flat: Vec<T>, height: usize, width: usize) -> DecodeResult<Vec<T>> {
    if height.checked_mul(width) != Some(flat.len()) {
        return Err(DecodeError::GridMismatch {
            height,
            width,
            len: flat.len(),
        });
    }

    let mut slots: Vec<Option<T>> = flat.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    for row in 0..height {
        for col in 0..width {
            // Each source index is visited exactly once.
            if let Some(item) = slots[col * height + row].take() {
                out.push(item);
            }
        }
    }
    Ok(out)
}
