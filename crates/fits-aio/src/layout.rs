//! HDU layout planning: schema to absolute byte offsets.
//!
//! The writer fixes the position of every HDU before the first byte is
//! written. Each HDU occupies one 2880-byte header block followed by its
//! block-padded data segment, so all offsets fall on block boundaries and
//! every descriptor can be constructed in a single pass without seeking.

use crate::block::{round_up_block, BLOCK_SIZE};
use crate::element::Bitpix;
use crate::error::{Error, Result};

/// One schema entry: the element type and axis extents of an HDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extent {
    /// Element type tag.
    pub bitpix: Bitpix,
    /// Axis extents, outermost first. May be empty (`NAXIS = 0`).
    pub axes: Vec<u64>,
}

impl Extent {
    /// Creates a schema entry.
    pub fn new(bitpix: Bitpix, axes: impl Into<Vec<u64>>) -> Self {
        Extent {
            bitpix,
            axes: axes.into(),
        }
    }

    /// Unpadded data size in bytes: `product(axes) * element_size`.
    ///
    /// Zero when no axes are declared. Fails with [`Error::OutOfBounds`]
    /// when the product does not fit in a `u64`.
    pub fn data_size(&self) -> Result<u64> {
        if self.axes.is_empty() {
            return Ok(0);
        }
        self.axes
            .iter()
            .try_fold(self.bitpix.element_size(), |acc, &n| acc.checked_mul(n))
            .ok_or(Error::OutOfBounds)
    }
}

/// The planned placement of one HDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Absolute byte offset of the HDU's header block.
    pub offset: u64,
    /// Unpadded data size in bytes.
    pub data_size: u64,
    /// Block-padded data segment length.
    pub data_block_size: u64,
}

/// A fully planned file layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    placements: Vec<Placement>,
    total_size: u64,
}

impl Layout {
    /// Placements in schema order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Total on-disk file length, a multiple of the block size.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

/// Computes the placement of every HDU in the schema.
///
/// `offset[0] = 0`; each subsequent HDU starts one header block plus one
/// padded data segment after its predecessor.
pub fn plan(schema: &[Extent]) -> Result<Layout> {
    let mut placements = Vec::with_capacity(schema.len());
    let mut offset: u64 = 0;

    for extent in schema {
        let data_size = extent.data_size()?;
        let data_block_size = round_up_block(data_size);
        placements.push(Placement {
            offset,
            data_size,
            data_block_size,
        });
        offset = offset
            .checked_add(BLOCK_SIZE)
            .and_then(|o| o.checked_add(data_block_size))
            .ok_or(Error::OutOfBounds)?;
    }

    Ok(Layout {
        placements,
        total_size: offset,
    })
}

/// Block-padded data segment length for a parsed header's shape.
pub fn padded_data_size(element_size: u64, axes: &[u64]) -> u64 {
    if axes.is_empty() {
        return 0;
    }
    let bytes = axes.iter().fold(element_size, |acc, &n| acc * n);
    round_up_block(bytes)
}
