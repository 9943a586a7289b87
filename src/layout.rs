use crate::StrError;

/// Describes a strided rectangular sub-block of a row-major array
///
/// The sub-block consists of `block_count` runs of `block_len` contiguous
/// values; consecutive runs start `stride` values apart, the first one at
/// `offset`. A row of a tile is a single run; a column is `block_count` runs of
/// length one with `stride = ncol`.
///
/// ```text
///  offset
///    ↓
///  . x x x . . . .     stride = 8
///  . x x x . . . .     block_len = 3
///  . x x x . . . .     block_count = 3
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    pub offset: usize,
    pub stride: usize,
    pub block_len: usize,
    pub block_count: usize,
}

impl BlockLayout {
    /// Describes the rectangle with upper-left corner (i, j) and `nrow × ncol` values
    ///
    /// `stride` is the number of columns of the whole array.
    pub fn rectangle(stride: usize, i: usize, j: usize, nrow: usize, ncol: usize) -> Self {
        BlockLayout {
            offset: i * stride + j,
            stride,
            block_len: ncol,
            block_count: nrow,
        }
    }

    /// Describes `len` values of row i starting at column j
    pub fn row(stride: usize, i: usize, j: usize, len: usize) -> Self {
        BlockLayout::rectangle(stride, i, j, 1, len)
    }

    /// Describes `len` values of column j starting at row i
    pub fn column(stride: usize, i: usize, j: usize, len: usize) -> Self {
        BlockLayout::rectangle(stride, i, j, len, 1)
    }

    /// Returns the number of values in the sub-block
    pub fn len(&self) -> usize {
        self.block_len * self.block_count
    }

    /// Returns true if the sub-block has no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the sub-block fits into an array with `data_len` values
    fn check(&self, data_len: usize) -> Result<(), StrError> {
        if self.is_empty() {
            return Ok(());
        }
        if self.block_count > 1 && self.block_len > self.stride {
            return Err("block_len must be ≤ stride");
        }
        let end = self.offset + (self.block_count - 1) * self.stride + self.block_len;
        if end > data_len {
            return Err("block layout exceeds the array");
        }
        Ok(())
    }
}

/// Copies the sub-block described by `layout` out of `src` into the contiguous buffer `dst`
pub fn pack(src: &[f64], layout: &BlockLayout, dst: &mut [f64]) -> Result<(), StrError> {
    layout.check(src.len())?;
    if dst.len() != layout.len() {
        return Err("packed buffer has the wrong length");
    }
    for (k, chunk) in dst.chunks_mut(layout.block_len.max(1)).enumerate() {
        let start = layout.offset + k * layout.stride;
        chunk.copy_from_slice(&src[start..start + layout.block_len]);
    }
    Ok(())
}

/// Copies the contiguous buffer `src` into the sub-block described by `layout` of `dst`
pub fn unpack(src: &[f64], layout: &BlockLayout, dst: &mut [f64]) -> Result<(), StrError> {
    layout.check(dst.len())?;
    if src.len() != layout.len() {
        return Err("packed buffer has the wrong length");
    }
    for (k, chunk) in src.chunks(layout.block_len.max(1)).enumerate() {
        let start = layout.offset + k * layout.stride;
        dst[start..start + layout.block_len].copy_from_slice(chunk);
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
