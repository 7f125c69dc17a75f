//! Tensor dimensions and sequence-length metadata.

use crate::error::Error;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a dimension whose size is not known until runtime.
pub const DYNAMIC_DIM: i64 = -1;

/// Level-of-detail offsets: one offset table per nesting level.
pub type Lod = Vec<Vec<u64>>;

/// Ordered tensor dimensions. A `-1` entry is a dynamic dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(transparent))]
pub struct Shape {
    dims: Vec<i64>,
}

impl Shape {
    pub fn new(dims: Vec<i64>) -> Self {
        Self { dims }
    }

    /// Builds a fully static shape from `usize` sizes.
    pub fn from_usize(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().map(|&d| d as i64).collect(),
        }
    }

    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dims.iter().any(|&d| d == DYNAMIC_DIM)
    }

    /// Number of elements, or an error when a dimension is dynamic or negative.
    pub fn production(&self) -> Result<usize, Error> {
        self.dims.iter().try_fold(1usize, |acc, &d| {
            if d < 0 {
                Err(Error::ShapeError(format!(
                    "cannot count elements of shape {} with dimension {}",
                    self, d
                )))
            } else {
                acc.checked_mul(d as usize).ok_or_else(|| {
                    Error::ShapeError(format!("element count of shape {} overflows usize", self))
                })
            }
        })
    }

    /// Static sizes, for building ndarray views.
    pub fn to_usize(&self) -> Result<Vec<usize>, Error> {
        self.dims
            .iter()
            .map(|&d| {
                usize::try_from(d).map_err(|_| {
                    Error::ShapeError(format!("shape {} has non-static dimension {}", self, d))
                })
            })
            .collect()
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.dims
    }
}

impl From<Vec<i64>> for Shape {
    fn from(dims: Vec<i64>) -> Self {
        Self::new(dims)
    }
}

impl From<&[i64]> for Shape {
    fn from(dims: &[i64]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl std::ops::Index<usize> for Shape {
    type Output = i64;

    fn index(&self, index: usize) -> &i64 {
        &self.dims[index]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}
