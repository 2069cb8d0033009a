//! Writing FITS files: up-front layout, eager headers, positional data.
//!
//! [`FitsWriter::create`] plans every HDU's placement from the schema,
//! sizes the file to its final length (the data area starts as a sparse
//! hole) and writes each HDU's mandatory records synchronously before
//! returning. Data writes afterwards are positional transfers addressed by
//! HDU index plus element index, so bulk writes never seek.
//!
//! Every HDU is emitted with `SIMPLE = T`, including the ones after the
//! first, where the published FITS standard wants an `XTENSION` record
//! instead. Readers that key on the shape keywords, as this crate's reader
//! does, accept both forms.

use std::cell::Cell;
use std::path::Path;

use crate::block::{element_offset, BLOCK_SIZE, RECORD_SIZE};
use crate::element::{Bitpix, Element};
use crate::engine::{IoEngine, OpId};
use crate::error::{Error, Result};
use crate::layout::{plan, Extent, Layout};
use crate::record::{format_end_record, format_record};

#[derive(Debug)]
struct OutHdu {
    offset: u64,
    data_size: u64,
    data_block_size: u64,
    bitpix: Bitpix,
    axes: Vec<u64>,
    // Grows under a shared borrow; every other field is fixed at layout time.
    records: Cell<usize>,
}

/// A FITS file being written.
#[derive(Debug)]
pub struct FitsWriter {
    engine: IoEngine,
    hdus: Vec<OutHdu>,
}

impl FitsWriter {
    /// Creates (or truncates) `path` and lays out one HDU per schema entry.
    ///
    /// All mandatory header records (`SIMPLE`, `BITPIX`, `NAXIS`,
    /// `NAXIS1..n`, `EXTEND`, `END`) are written before this returns. If
    /// construction fails, the partially written file is removed.
    pub fn create(path: impl AsRef<Path>, schema: &[Extent]) -> Result<Self> {
        let path = path.as_ref();
        let layout = plan(schema)?;
        let engine = IoEngine::create(path)?;
        match init(&engine, schema, &layout) {
            Ok(hdus) => {
                log::debug!(
                    "{}: laid out {} HDU(s), {} bytes",
                    path.display(),
                    hdus.len(),
                    layout.total_size()
                );
                Ok(FitsWriter { engine, hdus })
            }
            Err(e) => {
                let _ = std::fs::remove_file(path);
                Err(e)
            }
        }
    }

    /// Number of HDUs in the file.
    pub fn len(&self) -> usize {
        self.hdus.len()
    }

    /// Returns `true` if the schema was empty.
    pub fn is_empty(&self) -> bool {
        self.hdus.is_empty()
    }

    /// Returns the HDU at `index`, or `None` if out of range.
    pub fn hdu(&self, index: usize) -> Option<Hdu<'_>> {
        self.hdus.get(index).map(|data| Hdu {
            engine: &self.engine,
            data,
        })
    }

    /// Iterates over all HDUs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = Hdu<'_>> {
        self.hdus.iter().map(|data| Hdu {
            engine: &self.engine,
            data,
        })
    }

    /// Drives queued asynchronous writes to completion.
    pub fn run(&self) {
        self.engine.run();
    }

    /// Cancels pending asynchronous writes.
    pub fn stop(&self) {
        self.engine.stop();
    }
}

fn init(engine: &IoEngine, schema: &[Extent], layout: &Layout) -> Result<Vec<OutHdu>> {
    engine.set_len(layout.total_size())?;

    let mut hdus = Vec::with_capacity(schema.len());
    for (extent, placement) in schema.iter().zip(layout.placements()) {
        let hdu = OutHdu {
            offset: placement.offset,
            data_size: placement.data_size,
            data_block_size: placement.data_block_size,
            bitpix: extent.bitpix,
            axes: extent.axes.clone(),
            records: Cell::new(0),
        };

        emit_record(engine, &hdu, "SIMPLE", "T")?;
        emit_record(engine, &hdu, "BITPIX", &extent.bitpix.value().to_string())?;
        emit_record(engine, &hdu, "NAXIS", &extent.axes.len().to_string())?;
        for (i, &n) in extent.axes.iter().enumerate() {
            emit_record(engine, &hdu, &format!("NAXIS{}", i + 1), &n.to_string())?;
        }
        emit_record(engine, &hdu, "EXTEND", "T")?;
        emit_end(engine, &hdu)?;

        hdus.push(hdu);
    }
    Ok(hdus)
}

/// Writes one record into the next free slot of the HDU's header block.
///
/// Fails with [`Error::HeaderFull`] when all 36 slots hold records.
fn emit_record(engine: &IoEngine, hdu: &OutHdu, keyword: &str, value: &str) -> Result<()> {
    let slot = hdu.records.get();
    if (slot * RECORD_SIZE) as u64 >= BLOCK_SIZE {
        return Err(Error::HeaderFull);
    }
    let position = hdu.offset + (slot * RECORD_SIZE) as u64;
    engine.write_at(position, &format_record(keyword, value))?;
    hdu.records.set(slot + 1);
    Ok(())
}

/// Writes the END record into the slot after the last emitted record.
fn emit_end(engine: &IoEngine, hdu: &OutHdu) -> Result<()> {
    let position = hdu.offset + (hdu.records.get() * RECORD_SIZE) as u64;
    engine.write_at(position, &format_end_record())?;
    Ok(())
}

/// One HDU of a file being written.
#[derive(Debug, Clone, Copy)]
pub struct Hdu<'f> {
    engine: &'f IoEngine,
    data: &'f OutHdu,
}

impl Hdu<'_> {
    /// Number of header records written, excluding `END`.
    pub fn record_count(&self) -> usize {
        self.data.records.get()
    }

    /// Element type of the data block.
    pub fn bitpix(&self) -> Bitpix {
        self.data.bitpix
    }

    /// Axis extents, outermost first.
    pub fn axes(&self) -> &[u64] {
        &self.data.axes
    }

    /// Absolute byte offset of the HDU's header block.
    pub fn offset(&self) -> u64 {
        self.data.offset
    }

    /// Block-padded data segment length in bytes.
    pub fn data_block_size(&self) -> u64 {
        self.data.data_block_size
    }

    /// Appends a header record.
    ///
    /// The record overwrites the slot currently holding `END`, and a fresh
    /// `END` is written one slot later. Writing the same keyword twice
    /// produces two records; nothing is deduplicated. The value is written
    /// verbatim, unquoted. Fails with [`Error::HeaderFull`] once all 36
    /// slots hold records.
    pub fn put_header(&self, keyword: &str, value: &str) -> Result<()> {
        emit_record(self.engine, self.data, keyword, value)?;
        emit_end(self.engine, self.data)
    }

    /// Writes `data` starting at the given element index.
    ///
    /// Blocks until the transfer completes and returns the bytes written.
    /// Fails with [`Error::TypeMismatch`] if `T` does not match the schema
    /// and [`Error::OutOfBounds`] if the transfer would overflow the data
    /// block.
    pub fn write_data<T: Element>(&self, index: &[u64], data: &[T]) -> Result<usize> {
        let offset = self.transfer_offset::<T>(index, std::mem::size_of_val(data) as u64)?;
        self.engine.write_at(offset, bytemuck::cast_slice(data))
    }

    /// Queues an asynchronous write of `data` at the given element index.
    ///
    /// The token runs inside [`FitsWriter::run`] with the bytes written, or
    /// with [`Error::Cancelled`] if the writer is stopped first.
    pub fn async_write_data<T: Element>(
        &self,
        index: &[u64],
        data: &[T],
        token: impl FnOnce(Result<usize>) + 'static,
    ) -> Result<OpId> {
        let offset = self.transfer_offset::<T>(index, std::mem::size_of_val(data) as u64)?;
        Ok(self
            .engine
            .async_write_at(offset, bytemuck::cast_slice(data).to_vec(), token))
    }

    /// Maps an element index to an absolute file offset, bounds-checked
    /// against the unpadded data size for a transfer of `len` bytes.
    ///
    /// The index is validated before the element tag so an out-of-range
    /// index reports [`Error::OutOfBounds`] whatever buffer type the caller
    /// supplied.
    fn transfer_offset<T: Element>(&self, index: &[u64], len: u64) -> Result<u64> {
        let byte_off = element_offset(index, &self.data.axes, T::BITPIX.element_size())?;
        if T::BITPIX != self.data.bitpix {
            return Err(Error::TypeMismatch {
                expected: self.data.bitpix.value(),
                found: T::BITPIX.value(),
            });
        }
        let end = byte_off.checked_add(len).ok_or(Error::OutOfBounds)?;
        if end > self.data.data_size {
            return Err(Error::OutOfBounds);
        }
        Ok(self.data.offset + BLOCK_SIZE + byte_off)
    }
}
