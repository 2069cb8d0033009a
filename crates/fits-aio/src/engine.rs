//! Positional file I/O and the single-threaded completion executor.
//!
//! The engine owns the file handle exclusively. All transfers address
//! absolute byte offsets; reads and writes never share a cursor, so
//! operations on disjoint ranges are independent. Asynchronous operations
//! are queued and their completion tokens run inside [`IoEngine::run`],
//! one at a time, in issue order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Identifier of a queued asynchronous operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId(u64);

/// Completion token of an asynchronous read: receives the filled buffer.
pub type ReadToken = Box<dyn FnOnce(Result<Vec<u8>>)>;

/// Completion token of an asynchronous write: receives the bytes written.
pub type WriteToken = Box<dyn FnOnce(Result<usize>)>;

enum Op {
    Read {
        offset: u64,
        len: usize,
        token: ReadToken,
    },
    Write {
        offset: u64,
        bytes: Vec<u8>,
        token: WriteToken,
    },
}

impl Op {
    fn cancel(self) {
        match self {
            Op::Read { token, .. } => token(Err(Error::Cancelled)),
            Op::Write { token, .. } => token(Err(Error::Cancelled)),
        }
    }
}

#[derive(Default)]
struct Executor {
    queue: VecDeque<(OpId, Op)>,
    next_id: u64,
    stopped: bool,
}

impl Executor {
    fn push(&mut self, op: Op) -> OpId {
        let id = OpId(self.next_id);
        self.next_id += 1;
        self.queue.push_back((id, op));
        id
    }
}

/// Owns an open file and drives positional synchronous and asynchronous
/// transfers against it.
pub struct IoEngine {
    file: File,
    path: PathBuf,
    exec: RefCell<Executor>,
}

impl std::fmt::Debug for IoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoEngine")
            .field("path", &self.path)
            .field("pending", &self.exec.borrow().queue.len())
            .finish()
    }
}

impl IoEngine {
    /// Opens an existing file read-only. Fails if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        log::debug!("opened {} read-only", path.display());
        Ok(IoEngine {
            file,
            path,
            exec: RefCell::new(Executor::default()),
        })
    }

    /// Creates a file for writing, truncating pre-existing content.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        log::debug!("created {} write-only", path.display());
        Ok(IoEngine {
            file,
            path,
            exec: RefCell::new(Executor::default()),
        })
    }

    /// Path the engine was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the underlying file in bytes.
    pub fn file_size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub(crate) fn set_len(&self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        Ok(())
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`.
    ///
    /// Blocks until the transfer completes and returns the bytes read. The
    /// file cursor is not consulted or moved.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        pread_exact(&self.file, offset, buf)?;
        Ok(buf.len())
    }

    /// Writes all of `buf` starting at `offset`.
    ///
    /// Blocks until the transfer completes and returns the bytes written.
    /// The file cursor is not consulted or moved.
    pub fn write_at(&self, offset: u64, buf: &[u8]) -> Result<usize> {
        pwrite_all(&self.file, offset, buf)?;
        Ok(buf.len())
    }

    /// Queues an asynchronous read of `len` bytes at `offset`.
    ///
    /// The token runs inside [`IoEngine::run`] with the filled buffer, or
    /// with [`Error::Cancelled`] if the engine is stopped first.
    pub fn async_read_at(
        &self,
        offset: u64,
        len: usize,
        token: impl FnOnce(Result<Vec<u8>>) + 'static,
    ) -> OpId {
        self.exec.borrow_mut().push(Op::Read {
            offset,
            len,
            token: Box::new(token),
        })
    }

    /// Queues an asynchronous write of `bytes` at `offset`.
    ///
    /// The token runs inside [`IoEngine::run`] with the bytes written, or
    /// with [`Error::Cancelled`] if the engine is stopped first.
    pub fn async_write_at(
        &self,
        offset: u64,
        bytes: Vec<u8>,
        token: impl FnOnce(Result<usize>) + 'static,
    ) -> OpId {
        self.exec.borrow_mut().push(Op::Write {
            offset,
            bytes,
            token: Box::new(token),
        })
    }

    /// Number of operations waiting to complete.
    pub fn pending(&self) -> usize {
        self.exec.borrow().queue.len()
    }

    /// Drives queued operations to completion.
    ///
    /// Operations are dispatched one at a time in issue order, so two
    /// transfers targeting overlapping byte ranges always complete in the
    /// order they were queued. Returns when the queue is empty, or
    /// immediately after [`IoEngine::stop`] takes effect. Tokens may queue
    /// further operations; they are picked up by the same call.
    pub fn run(&self) {
        self.exec.borrow_mut().stopped = false;
        loop {
            let next = {
                let mut exec = self.exec.borrow_mut();
                if exec.stopped {
                    break;
                }
                exec.queue.pop_front()
            };
            let Some((_, op)) = next else {
                break;
            };
            match op {
                Op::Read { offset, len, token } => {
                    let mut buf = vec![0u8; len];
                    let result = pread_exact(&self.file, offset, &mut buf).map(|()| buf);
                    token(result);
                }
                Op::Write {
                    offset,
                    bytes,
                    token,
                } => {
                    let result = pwrite_all(&self.file, offset, &bytes).map(|()| bytes.len());
                    token(result);
                }
            }
        }
    }

    /// Stops the executor and cancels every pending operation.
    ///
    /// Each pending token completes with [`Error::Cancelled`]. A running
    /// [`IoEngine::run`] loop returns after the current operation; the next
    /// `run` call accepts work again.
    pub fn stop(&self) {
        let drained: Vec<(OpId, Op)> = {
            let mut exec = self.exec.borrow_mut();
            exec.stopped = true;
            exec.queue.drain(..).collect()
        };
        if !drained.is_empty() {
            log::debug!(
                "stop: cancelling {} pending operation(s) on {}",
                drained.len(),
                self.path.display()
            );
        }
        for (_, op) in drained {
            op.cancel();
        }
    }
}

fn pread_exact(file: &File, offset: u64, buf: &mut [u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_exact_at(buf, offset)?;
        Ok(())
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::FileExt;
        let mut done = 0;
        while done < buf.len() {
            let n = file.seek_read(&mut buf[done..], offset + done as u64)?;
            if n == 0 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                )));
            }
            done += n;
        }
        Ok(())
    }
}

fn pwrite_all(file: &File, offset: u64, buf: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.write_all_at(buf, offset)?;
        Ok(())
    }
    #[cfg(windows)]
    {
        use std::os::windows::fs::FileExt;
        let mut done = 0;
        while done < buf.len() {
            let n = file.seek_write(&buf[done..], offset + done as u64)?;
            if n == 0 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                )));
            }
            done += n;
        }
        Ok(())
    }
}
