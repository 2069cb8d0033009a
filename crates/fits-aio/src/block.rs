//! FITS 2880-byte block arithmetic and the index-to-offset mapping.

use crate::error::{Error, Result};

/// FITS block size in bytes (every header and data segment is block-aligned).
pub const BLOCK_SIZE: u64 = 2880;

/// FITS header record (keyword card) size in bytes.
pub const RECORD_SIZE: usize = 80;

/// Number of records that fit in a single header block.
pub const RECORDS_PER_BLOCK: usize = BLOCK_SIZE as usize / RECORD_SIZE;

/// Padding byte for header blocks (ASCII space).
pub const HEADER_PAD_BYTE: u8 = 0x20;

/// Maximum dimensionality a header may declare (NAXIS).
pub const MAX_AXES: usize = 999;

/// Rounds `n` up to the next multiple of [`BLOCK_SIZE`] (0 stays 0).
pub const fn round_up_block(n: u64) -> u64 {
    if n % BLOCK_SIZE == 0 {
        n
    } else {
        (n / BLOCK_SIZE + 1) * BLOCK_SIZE
    }
}

/// Returns the number of FITS blocks required to hold `n` bytes.
pub const fn blocks_needed(n: u64) -> u64 {
    round_up_block(n) / BLOCK_SIZE
}

/// Computes the byte offset of an element inside a data block.
///
/// The mapping is row-major over `axes` with the outermost (first) axis
/// varying slowest: `offset = elem_size * sum(index[d] * prod(axes[d+1..]))`.
/// A shorter `index` than `axes` addresses the start of a sub-slab, with the
/// trailing indices treated as zero.
///
/// Fails with [`Error::OutOfBounds`] if more indices are supplied than axes,
/// if the first index exceeds the first axis extent, or if the offset does
/// not fit in a `u64`.
pub fn element_offset(index: &[u64], axes: &[u64], elem_size: u64) -> Result<u64> {
    if index.len() > axes.len() {
        return Err(Error::OutOfBounds);
    }
    if let (Some(&first), Some(&extent)) = (index.first(), axes.first()) {
        if first > extent {
            return Err(Error::OutOfBounds);
        }
    }

    let mut elements: u64 = 0;
    for (d, &i) in index.iter().enumerate() {
        let stride = axes[d + 1..]
            .iter()
            .try_fold(1u64, |acc, &n| acc.checked_mul(n))
            .ok_or(Error::OutOfBounds)?;
        let term = i.checked_mul(stride).ok_or(Error::OutOfBounds)?;
        elements = elements.checked_add(term).ok_or(Error::OutOfBounds)?;
    }

    elements.checked_mul(elem_size).ok_or(Error::OutOfBounds)
}
