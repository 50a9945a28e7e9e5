//! What the request handling needs from a connection.
//!
//! [`Connection`] is the capability set the handling entry point works
//! against: a readable channel, a writable channel, and two controls that
//! only mean something for real sockets. [`PseudoConnection`] provides it
//! over a [`DuplexStream`].

use std::io;
use std::time::Duration;

use crate::stream::{DuplexStream, ReadChannel, WriteChannel};
use crate::Error;

/// Direction asked for when obtaining a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Read,
    Write,
}

/// Buffering asked for when obtaining a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buffering {
    Unbuffered,
    #[default]
    Default,
    Size(usize),
}

/// Low level socket options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOption {
    NoDelay(bool),
    KeepAlive(bool),
    ReuseAddress(bool),
}

/// Release of a write channel at the end of a transaction.
pub trait CloseChannel {
    fn close_channel(&mut self) -> io::Result<()>;
}

impl CloseChannel for WriteChannel {
    fn close_channel(&mut self) -> io::Result<()> {
        self.close();
        Ok(())
    }
}

/// Connection as seen by the handling entry point.
pub trait Connection {
    type Reader: io::Read;
    type Writer: io::Write + CloseChannel;

    fn readable_channel(
        &mut self,
        mode: ChannelMode,
        buffering: Buffering,
    ) -> io::Result<Self::Reader>;

    fn writable_channel(
        &mut self,
        mode: ChannelMode,
        buffering: Buffering,
    ) -> io::Result<Self::Writer>;

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Error>;

    fn set_socket_option(&mut self, option: SocketOption) -> Result<(), Error>;
}

/// [`Connection`] backed by a [`DuplexStream`].
///
/// Timeouts and socket options are ignored unless the connection is
/// [strict][PseudoConnection::strict], in which case they fail with
/// [`Error::NotApplicable`].
#[derive(Debug)]
pub struct PseudoConnection<'a> {
    stream: &'a DuplexStream,
    strict: bool,
}

impl<'a> PseudoConnection<'a> {
    pub fn new(stream: &'a DuplexStream) -> Self {
        PseudoConnection {
            stream,
            strict: false,
        }
    }

    pub fn strict(stream: &'a DuplexStream) -> Self {
        PseudoConnection {
            stream,
            strict: true,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn not_applicable(&self, op: &'static str) -> Result<(), Error> {
        if self.strict {
            return Err(Error::NotApplicable(op));
        }
        debug!("Ignore {} on memory connection", op);
        Ok(())
    }
}

fn check_mode(wanted: ChannelMode, mode: ChannelMode) -> io::Result<()> {
    if wanted != mode {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{:?} channel requested with mode {:?}", wanted, mode),
        ));
    }
    Ok(())
}

impl<'a> Connection for PseudoConnection<'a> {
    type Reader = ReadChannel;
    type Writer = WriteChannel;

    fn readable_channel(
        &mut self,
        mode: ChannelMode,
        _buffering: Buffering,
    ) -> io::Result<Self::Reader> {
        // The buffer is fully in memory, buffering makes no difference.
        check_mode(ChannelMode::Read, mode)?;
        Ok(self.stream.read_channel())
    }

    fn writable_channel(
        &mut self,
        mode: ChannelMode,
        _buffering: Buffering,
    ) -> io::Result<Self::Writer> {
        check_mode(ChannelMode::Write, mode)?;
        Ok(self.stream.write_channel())
    }

    fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), Error> {
        trace!("set_timeout: {:?}", timeout);
        self.not_applicable("set_timeout")
    }

    fn set_socket_option(&mut self, option: SocketOption) -> Result<(), Error> {
        trace!("set_socket_option: {:?}", option);
        self.not_applicable("set_socket_option")
    }
}
