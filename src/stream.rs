//! In-memory stand-in for the two directions of a connection.
//!
//! A [`DuplexStream`] holds the request bytes (`incoming`) and collects
//! everything written as response (`outgoing`). Channels handed out from it
//! share the underlying buffers, so a channel can be dropped or closed by
//! whoever holds it while the stream still sees the full content.
//!
//! ```
//! use std::io::{Read, Write};
//! use selfhost::stream::DuplexStream;
//!
//! let stream = DuplexStream::new(&b"ping"[..]);
//!
//! let mut input = String::new();
//! stream.read_channel().read_to_string(&mut input)?;
//! assert_eq!(input, "ping");
//!
//! let mut w = stream.write_channel();
//! w.write_all(b"pong")?;
//! w.close();
//! drop(w);
//!
//! assert_eq!(stream.into_written(), b"pong");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::rc::Rc;

/// Pair of in-memory buffers for one transaction.
///
/// `incoming` is never changed after construction. `outgoing` only grows,
/// strictly in the order of writes. The stream is not `Send`; it lives and
/// dies within a single transaction.
pub struct DuplexStream {
    incoming: Rc<[u8]>,
    read_pos: Rc<Cell<usize>>,
    outgoing: Rc<RefCell<Vec<u8>>>,
}

impl DuplexStream {
    pub fn new(incoming: impl Into<Vec<u8>>) -> Self {
        let incoming: Vec<u8> = incoming.into();
        DuplexStream {
            incoming: incoming.into(),
            read_pos: Rc::new(Cell::new(0)),
            outgoing: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Read side. All read channels share one position, the incoming bytes
    /// are yielded once.
    pub fn read_channel(&self) -> ReadChannel {
        ReadChannel {
            incoming: self.incoming.clone(),
            pos: self.read_pos.clone(),
        }
    }

    /// Write side. All write channels append to the same buffer.
    pub fn write_channel(&self) -> WriteChannel {
        WriteChannel {
            outgoing: self.outgoing.clone(),
        }
    }

    pub fn incoming(&self) -> &[u8] {
        &self.incoming
    }

    /// Copy of everything written so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.outgoing.borrow().clone()
    }

    pub fn written_len(&self) -> usize {
        self.outgoing.borrow().len()
    }

    /// Everything written. Copies only if a write channel is still alive.
    pub fn into_written(self) -> Vec<u8> {
        match Rc::try_unwrap(self.outgoing) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => RefCell::clone(&shared).into_inner(),
        }
    }
}

impl fmt::Debug for DuplexStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexStream")
            .field("incoming", &self.incoming.len())
            .field("read_pos", &self.read_pos.get())
            .field("outgoing", &self.outgoing.borrow().len())
            .finish()
    }
}

/// Read side of a [`DuplexStream`].
///
/// Reading past the end gives `Ok(0)`. There is no producer to wait for.
pub struct ReadChannel {
    incoming: Rc<[u8]>,
    pos: Rc<Cell<usize>>,
}

impl ReadChannel {
    fn remaining(&self) -> &[u8] {
        &self.incoming[self.pos.get()..]
    }
}

impl io::Read for ReadChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let rest = self.remaining();
        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos.set(self.pos.get() + n);
        Ok(n)
    }
}

impl io::BufRead for ReadChannel {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.remaining())
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.remaining().len());
        self.pos.set(self.pos.get() + amt);
    }
}

/// Write side of a [`DuplexStream`].
pub struct WriteChannel {
    outgoing: Rc<RefCell<Vec<u8>>>,
}

impl WriteChannel {
    /// Does nothing. The written content must survive the close a socket
    /// transaction does at the end, it is read back from the stream later.
    pub fn close(&mut self) {
        trace!("Ignore close of memory write channel");
    }
}

impl io::Write for WriteChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outgoing.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
