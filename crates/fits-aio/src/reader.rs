//! Reading FITS files: HDU discovery and typed data access.
//!
//! [`FitsReader::open`] scans the file once at construction, parsing each
//! header block and hopping over each data block, so every HDU's placement
//! is known up front. Data transfers afterwards are positional reads
//! against the recorded offsets.

use std::marker::PhantomData;
use std::path::Path;

use crate::block::{round_up_block, MAX_AXES, RECORD_SIZE};
use crate::element::{Bitpix, Element};
use crate::engine::{IoEngine, OpId};
use crate::error::{Error, Result};
use crate::header::HeaderMap;
use crate::layout::padded_data_size;
use crate::record::parse_record;

#[derive(Debug)]
struct HduData {
    headers: HeaderMap,
    header_start: u64,
    data_start: u64,
    data_block_size: u64,
    bitpix: Bitpix,
    axes: Vec<u64>,
}

/// A FITS file opened for reading.
#[derive(Debug)]
pub struct FitsReader {
    engine: IoEngine,
    hdus: Vec<HduData>,
}

impl FitsReader {
    /// Opens `path` read-only and scans every HDU in the file.
    ///
    /// Structural problems (a header without an `END` record, a truncated
    /// block, missing or non-numeric mandatory keywords, a `BITPIX` outside
    /// the supported set) fail with [`Error::Format`] naming the file and
    /// the underlying cause.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let engine = IoEngine::open(path)?;
        let hdus = scan(&engine).map_err(|cause| Error::Format {
            path: path.to_path_buf(),
            cause: Box::new(cause),
        })?;
        log::debug!("{}: scanned {} HDU(s)", path.display(), hdus.len());
        Ok(FitsReader { engine, hdus })
    }

    /// Number of HDUs in the file.
    pub fn len(&self) -> usize {
        self.hdus.len()
    }

    /// Returns `true` if the file holds no HDUs (never the case for a
    /// successfully opened file).
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

    /// Iterates over all HDUs in file order.
    pub fn iter(&self) -> impl Iterator<Item = Hdu<'_>> {
        self.hdus.iter().map(|data| Hdu {
            engine: &self.engine,
            data,
        })
    }

    /// Drives queued asynchronous reads to completion.
    pub fn run(&self) {
        self.engine.run();
    }

    /// Cancels pending asynchronous reads.
    pub fn stop(&self) {
        self.engine.stop();
    }
}

fn scan(engine: &IoEngine) -> Result<Vec<HduData>> {
    let file_size = engine.file_size()?;
    let mut hdus = Vec::new();
    let mut offset = 0u64;

    loop {
        let hdu = scan_hdu(engine, offset)?;
        offset = hdu.data_start + hdu.data_block_size;
        hdus.push(hdu);
        if offset >= file_size {
            break;
        }
    }

    Ok(hdus)
}

/// Parses one HDU's header starting at `start` and computes its placement.
fn scan_hdu(engine: &IoEngine, start: u64) -> Result<HduData> {
    let mut headers = HeaderMap::new();
    let mut buf = [0u8; RECORD_SIZE];
    let mut pos = start;

    loop {
        engine.read_at(pos, &mut buf).map_err(|e| match e {
            Error::Io(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Error::MissingEnd
            }
            other => other,
        })?;
        pos += RECORD_SIZE as u64;

        let record = parse_record(&buf);
        if record.is_end() {
            break;
        }
        headers.insert(record.keyword, record.value);
    }

    let data_start = round_up_block(pos);

    let bitpix = Bitpix::from_value(headers.value_as("BITPIX")?)?;
    let naxis: usize = headers.value_as("NAXIS")?;
    if naxis > MAX_AXES {
        return Err(Error::Parse(String::from("NAXIS")));
    }
    let mut axes = Vec::with_capacity(naxis);
    for i in 1..=naxis {
        axes.push(headers.value_as(&format!("NAXIS{i}"))?);
    }
    let data_block_size = padded_data_size(bitpix.element_size(), &axes);

    Ok(HduData {
        headers,
        header_start: start,
        data_start,
        data_block_size,
        bitpix,
        axes,
    })
}

/// One Header Data Unit of an open file.
#[derive(Debug, Clone, Copy)]
pub struct Hdu<'f> {
    engine: &'f IoEngine,
    data: &'f HduData,
}

impl<'f> Hdu<'f> {
    /// All header records of this HDU, in file order.
    pub fn headers(&self) -> &'f HeaderMap {
        &self.data.headers
    }

    /// Value of a header keyword; fails with [`Error::NotFound`] if absent.
    pub fn get_header(&self, keyword: &str) -> Result<&'f str> {
        self.data.headers.get(keyword)
    }

    /// Value of a header keyword, or `None` if absent.
    pub fn get_header_opt(&self, keyword: &str) -> Option<&'f str> {
        self.data.headers.get_opt(keyword)
    }

    /// Looks up a keyword and converts its value to `T`.
    pub fn value_as<T: std::str::FromStr>(&self, keyword: &str) -> Result<T> {
        self.data.headers.value_as(keyword)
    }

    /// Element type of the data block.
    pub fn bitpix(&self) -> Bitpix {
        self.data.bitpix
    }

    /// Axis extents, outermost first.
    pub fn axes(&self) -> &'f [u64] {
        &self.data.axes
    }

    /// Number of axes.
    pub fn naxis(&self) -> usize {
        self.data.axes.len()
    }

    /// Absolute byte offset of the HDU's header.
    pub fn header_start(&self) -> u64 {
        self.data.header_start
    }

    /// Absolute byte offset of the data block.
    pub fn data_start(&self) -> u64 {
        self.data.data_start
    }

    /// Block-padded data segment length in bytes.
    pub fn data_block_size(&self) -> u64 {
        self.data.data_block_size
    }

    /// Returns a typed view over the data block.
    ///
    /// Fails with [`Error::TypeMismatch`] if `T` does not match the HDU's
    /// BITPIX tag.
    pub fn view<T: Element>(&self) -> Result<View<'f, T>> {
        if T::BITPIX != self.data.bitpix {
            return Err(Error::TypeMismatch {
                expected: self.data.bitpix.value(),
                found: T::BITPIX.value(),
            });
        }
        Ok(View {
            hdu: *self,
            _element: PhantomData,
        })
    }

    /// Calls the visitor with a view typed by the HDU's BITPIX tag.
    pub fn apply<V: HduVisitor>(&self, visitor: V) -> V::Output {
        fn typed<'f, T: Element>(hdu: Hdu<'f>) -> View<'f, T> {
            View {
                hdu,
                _element: PhantomData,
            }
        }
        match self.data.bitpix {
            Bitpix::U8 => visitor.visit(typed::<u8>(*self)),
            Bitpix::I16 => visitor.visit(typed::<i16>(*self)),
            Bitpix::I32 => visitor.visit(typed::<i32>(*self)),
            Bitpix::I64 => visitor.visit(typed::<i64>(*self)),
            Bitpix::F32 => visitor.visit(typed::<f32>(*self)),
            Bitpix::F64 => visitor.visit(typed::<f64>(*self)),
        }
    }
}

/// Receives a typed view of an HDU chosen at runtime from its BITPIX tag.
pub trait HduVisitor {
    /// Result produced by the visit.
    type Output;

    /// Invoked with the view matching the HDU's element type.
    fn visit<T: Element>(self, view: View<'_, T>) -> Self::Output;
}

/// A data-block view typed by the HDU's element type.
pub struct View<'f, T: Element> {
    hdu: Hdu<'f>,
    _element: PhantomData<T>,
}

impl<'f, T: Element> View<'f, T> {
    /// The HDU this view belongs to.
    pub fn hdu(&self) -> Hdu<'f> {
        self.hdu
    }

    /// Reads `buf.len()` elements starting at the given index.
    ///
    /// Blocks until the transfer completes and returns the bytes read.
    /// Fails with [`Error::OutOfBounds`] if the transfer would leave the
    /// data block.
    pub fn read_data(&self, index: &[u64], buf: &mut [T]) -> Result<usize> {
        let offset = self.transfer_offset(index, std::mem::size_of_val(buf) as u64)?;
        self.hdu.engine.read_at(offset, bytemuck::cast_slice_mut(buf))
    }

    /// Queues an asynchronous read of `count` elements at the given index.
    ///
    /// The token runs inside [`FitsReader::run`] with the filled buffer;
    /// its byte length is the transfer size.
    pub fn async_read_data(
        &self,
        index: &[u64],
        count: usize,
        token: impl FnOnce(Result<Vec<T>>) + 'static,
    ) -> Result<OpId> {
        let len = count as u64 * T::BITPIX.element_size();
        let offset = self.transfer_offset(index, len)?;
        Ok(self.hdu.engine.async_read_at(offset, len as usize, |res| {
            token(res.map(|bytes| bytemuck::pod_collect_to_vec(&bytes)))
        }))
    }

    /// Maps an element index to an absolute file offset, bounds-checked
    /// against the data block for a transfer of `len` bytes.
    fn transfer_offset(&self, index: &[u64], len: u64) -> Result<u64> {
        let data = self.hdu.data;
        let byte_off =
            crate::block::element_offset(index, &data.axes, T::BITPIX.element_size())?;
        let end = byte_off.checked_add(len).ok_or(Error::OutOfBounds)?;
        if end > data.data_block_size {
            return Err(Error::OutOfBounds);
        }
        Ok(data.data_start + byte_off)
    }
}
