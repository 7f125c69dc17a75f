//! Broadcast shape resolution for two-input elementwise ops.
//!
//! The shorter shape is embedded into a virtual array of the longer rank at
//! offset `axis`, with every other slot set to `1`. The output takes the
//! larger of each aligned pair, except that a dynamic (`-1`) dimension on
//! either side yields `1`.

use crate::error::Error;
use crate::shape::{Shape, DYNAMIC_DIM};

/// Axis value asking for trailing-dimension alignment.
pub const AUTO_AXIS: i32 = -1;

/// Resolves `axis` against the two ranks.
///
/// `-1` becomes `|rank_a - rank_b|`; any other value must lie in
/// `[0, max_rank - min_rank]`.
pub fn resolve_axis(rank_a: usize, rank_b: usize, axis: i32) -> Result<usize, Error> {
    let diff = rank_a.abs_diff(rank_b);
    if axis == AUTO_AXIS {
        return Ok(diff);
    }
    match usize::try_from(axis) {
        Ok(a) if a <= diff => Ok(a),
        _ => Err(Error::ShapeError(format!(
            "axis {} out of range [0, {}] for ranks {} and {}",
            axis, diff, rank_a, rank_b
        ))),
    }
}

/// Virtual array of length `rank` holding `dims` at offset `axis`, `1` elsewhere.
/// `axis + dims.len()` must not exceed `rank`; [`resolve_axis`] guarantees it.
pub(crate) fn align(dims: &[i64], axis: usize, rank: usize) -> Vec<i64> {
    let mut aligned = vec![1; rank];
    aligned[axis..axis + dims.len()].copy_from_slice(dims);
    aligned
}

/// Computes the broadcasted dims of `a` and `b` under `axis`.
pub fn resolve_dims(a: &[i64], b: &[i64], axis: i32) -> Result<Vec<i64>, Error> {
    let mismatch = |reason: String| Error::ShapeMismatch {
        op: "broadcast".to_string(),
        shape_a: a.to_vec(),
        shape_b: b.to_vec(),
        axis,
        reason,
    };

    if let Some(&bad) = a.iter().chain(b.iter()).find(|&&d| d < DYNAMIC_DIM) {
        return Err(mismatch(format!("invalid dimension {}", bad)));
    }

    if a == b {
        return Ok(a.to_vec());
    }

    let max_rank = a.len().max(b.len());
    let axis = resolve_axis(a.len(), b.len(), axis).map_err(|e| mismatch(e.to_string()))?;

    let (a_aligned, b_aligned) = if a.len() > b.len() {
        (a.to_vec(), align(b, axis, max_rank))
    } else {
        (align(a, axis, max_rank), b.to_vec())
    };

    let out = a_aligned
        .iter()
        .zip(b_aligned.iter())
        .map(|(&x, &y)| {
            if x == DYNAMIC_DIM || y == DYNAMIC_DIM {
                1
            } else {
                x.max(y)
            }
        })
        .collect::<Vec<_>>();

    debug_println!(
        "resolve_dims: a={:?} b={:?} axis={} -> {:?}",
        a_aligned,
        b_aligned,
        axis,
        out
    );
    Ok(out)
}

/// Computes the broadcasted output shape of `a` and `b`.
///
/// Identical inputs return `a` unchanged without inspecting `axis`.
pub fn resolve(a: &Shape, b: &Shape, axis: i32) -> Result<Shape, Error> {
    resolve_dims(a.dims(), b.dims(), axis).map(Shape::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_pads_both_sides() {
        assert_eq!(align(&[3], 1, 3), vec![1, 3, 1]);
        assert_eq!(align(&[3, 4], 0, 4), vec![3, 4, 1, 1]);
        assert_eq!(align(&[], 0, 2), vec![1, 1]);
    }

    #[test]
    fn test_resolve_axis() {
        assert_eq!(resolve_axis(3, 1, -1).unwrap(), 2);
        assert_eq!(resolve_axis(1, 3, -1).unwrap(), 2);
        assert_eq!(resolve_axis(3, 1, 0).unwrap(), 0);
        assert!(resolve_axis(3, 1, 3).is_err());
        assert!(resolve_axis(3, 1, -2).is_err());
    }
}
