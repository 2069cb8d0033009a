//! Positional asynchronous I/O for FITS image files.
//!
//! A FITS file is an ordered sequence of Header Data Units; each HDU pairs
//! an ASCII keyword header with a typed multi-dimensional data block, both
//! padded to 2880-byte boundaries. This crate plans the byte layout of
//! every HDU up front, so reads and writes become positional transfers at
//! precomputed offsets: no seeking between operations, and any number of
//! asynchronous transfers in flight against the same file.
//!
//! Write a file with [`FitsWriter`], giving the element type and axis
//! extents of each HDU:
//!
//! ```no_run
//! use fits_aio::{Bitpix, Extent, FitsWriter};
//!
//! # fn main() -> fits_aio::Result<()> {
//! let writer = FitsWriter::create(
//!     "cube.fits",
//!     &[
//!         Extent::new(Bitpix::U8, [200, 300]),
//!         Extent::new(Bitpix::F32, [100, 50, 50]),
//!     ],
//! )?;
//! let frame = vec![0.0f32; 50 * 50];
//! writer.hdu(1).unwrap().async_write_data(&[3], &frame, |res| {
//!     res.unwrap();
//! })?;
//! writer.run();
//! # Ok(())
//! # }
//! ```
//!
//! Read one back with [`FitsReader`], which scans every HDU at open time
//! and hands out typed views dispatched on the header's BITPIX tag.

#![warn(missing_docs)]

/// FITS 2880-byte block arithmetic and the index-to-offset mapping.
pub mod block;
/// Element type tags and the typed-buffer trait.
pub mod element;
/// Positional file I/O and the single-threaded completion executor.
pub mod engine;
/// Error types used throughout the crate.
pub mod error;
/// Keyword/value header container with case-insensitive lookup.
pub mod header;
/// HDU layout planning: schema to absolute byte offsets.
pub mod layout;
/// Reading FITS files: HDU discovery and typed data access.
pub mod reader;
/// Fixed 80-byte header record encoding and decoding.
pub mod record;
/// Writing FITS files: up-front layout, eager headers, positional data.
pub mod writer;

pub use block::{BLOCK_SIZE, RECORD_SIZE, RECORDS_PER_BLOCK};
pub use element::{Bitpix, Element};
pub use engine::{IoEngine, OpId};
pub use error::{Error, Result};
pub use header::HeaderMap;
pub use layout::Extent;
pub use reader::{FitsReader, HduVisitor};
pub use writer::FitsWriter;
