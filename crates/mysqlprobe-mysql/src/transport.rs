//! Reading the first packet off a connection.
//!
//! The reader frames exactly one packet: a 4-byte header, then as much of
//! the declared payload as the server delivers before a read fails or
//! times out. Only a failed header read is an error; a short payload is
//! returned as-is for the decoder to judge.

use std::io::{self, Read};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use mysqlprobe_core::ReadError;

use crate::protocol::{PacketHeader, RawPacket};

/// A byte stream whose next reads can be bounded by a timeout.
pub trait TimedRead: Read {
    /// Bound every subsequent read call by `timeout`.
    fn arm_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl TimedRead for TcpStream {
    fn arm_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(timeout))
    }
}

impl<T: TimedRead + ?Sized> TimedRead for &mut T {
    fn arm_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).arm_read_timeout(timeout)
    }
}

/// How the read timeout is applied across the reads of one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadDeadline {
    /// Re-arm the full timeout before every individual read.
    ///
    /// A server trickling bytes just under the timeout can stretch the
    /// total read time without bound.
    #[default]
    PerRead,
    /// One deadline for the whole packet; each read gets what is left.
    Overall,
}

/// Tracks how long the next read may block.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    policy: ReadDeadline,
    timeout: Duration,
    started: Instant,
}

impl Deadline {
    fn start(timeout: Duration, policy: ReadDeadline) -> Self {
        Self {
            policy,
            timeout,
            started: Instant::now(),
        }
    }

    /// Timeout for the next read, or `None` once the overall deadline passed.
    fn next_read(&self) -> Option<Duration> {
        match self.policy {
            ReadDeadline::PerRead => Some(self.timeout),
            ReadDeadline::Overall => self
                .timeout
                .checked_sub(self.started.elapsed())
                .filter(|left| !left.is_zero()),
        }
    }
}

/// Read the first packet a server sends.
///
/// Fails only when the 4-byte header cannot be read. An anomalous declared
/// length (zero, or above [`MAX_DECLARED_PAYLOAD`](crate::protocol::MAX_DECLARED_PAYLOAD))
/// yields the header alone. Any error or EOF during the payload ends the
/// read with whatever arrived so far.
pub fn read_first_packet<S: TimedRead>(
    stream: &mut S,
    timeout: Duration,
    policy: ReadDeadline,
) -> Result<RawPacket, ReadError> {
    let deadline = Deadline::start(timeout, policy);

    let header_buf = read_header(stream, &deadline)?;

    let header = PacketHeader::from_bytes(&header_buf);
    let mut packet = header_buf.to_vec();
    if header.is_anomalous() {
        tracing::warn!(
            declared = header.payload_length,
            "Anomalous payload length, keeping header only"
        );
        return Ok(RawPacket::new(packet));
    }

    let payload_len = header.payload_len();
    tracing::debug!(
        payload_len,
        sequence_id = header.sequence_id,
        "Read packet header"
    );

    packet.resize(PacketHeader::SIZE + payload_len, 0);
    let mut read = 0;
    while read < payload_len {
        let Some(wait) = deadline.next_read() else {
            tracing::debug!(read, payload_len, "Packet deadline expired");
            break;
        };
        if let Err(e) = stream.arm_read_timeout(wait) {
            tracing::debug!(error = %e, "Could not arm read timeout");
            break;
        }
        match stream.read(&mut packet[PacketHeader::SIZE + read..]) {
            Ok(0) => {
                tracing::debug!(read, payload_len, "Connection closed mid-payload");
                break;
            }
            Ok(n) => {
                read += n;
                tracing::trace!(chunk = n, read, payload_len, "Read payload chunk");
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::debug!(error = %e, read, payload_len, "Payload read stopped");
                break;
            }
        }
    }

    packet.truncate(PacketHeader::SIZE + read);
    Ok(RawPacket::new(packet))
}

/// Read the 4-byte header, re-arming the timeout before every read.
fn read_header<S: TimedRead>(
    stream: &mut S,
    deadline: &Deadline,
) -> Result<[u8; PacketHeader::SIZE], ReadError> {
    let mut buf = [0u8; PacketHeader::SIZE];
    let mut read = 0;
    while read < buf.len() {
        let wait = deadline.next_read().ok_or_else(|| {
            ReadError::header(io::Error::new(
                io::ErrorKind::TimedOut,
                "read deadline expired",
            ))
        })?;
        stream.arm_read_timeout(wait).map_err(ReadError::header)?;
        match stream.read(&mut buf[read..]) {
            Ok(0) => {
                return Err(ReadError::header(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before packet header",
                )));
            }
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ReadError::header(e)),
        }
    }
    Ok(buf)
}
