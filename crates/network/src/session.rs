//! # Transport Session
//!
//! One TCP connection to a map server plus the lock that serializes calls on it.
//!
//! # Exchange
//!
//! ```text
//! client                         server
//!   | -- request frame ----------> |
//!   | <--------- CONTINUE frame -- |
//!   | -- ACK frame --------------> |
//!   | <--------- CONTINUE frame -- |
//!   | -- ACK frame --------------> |
//!   | <---------- SUCCESS frame -- |
//!   | -- ACK frame (EveryFrame) -> |
//! ```
//!
//! The payload of every received frame is appended in order. The terminal
//! frame's status becomes the header of the assembled response.
//!
//! # Thread Safety
//!
//! The socket sits behind a `tokio::sync::Mutex` held for the full
//! send-then-receive exchange, so concurrent callers never interleave frames.
//! Counters live behind a `parking_lot::Mutex` and can be read without
//! waiting for an exchange in flight.
//!
//! # Failure
//!
//! Any socket fault or timeout drops the stream. The session does not
//! reconnect; later calls fail with `Connection("session closed")`.
//!
//! [`Session::close`] raises a shutdown flag outside the stream lock before
//! taking the socket. A call blocked on a read or write sees the flag and
//! fails with `Connection("session closed")` instead of waiting out its
//! timeout.

use bytes::{BufMut, Bytes, BytesMut};
use parking_lot::Mutex;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex as TokioMutex};
use tracing::{debug, info, trace, warn};
use weightmap_core::{Result, WeightMapError};
use weightmap_protocol::codecs::read_ascii;
use weightmap_protocol::{
    ack_frame, encode_request, read_header, Frame, Opcode, ResponseStatus, FRAME_SIZE,
    HEADER_SIZE,
};

use crate::config::{AckMode, SessionConfig};

/// Traffic counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Completed request/response exchanges
    pub exchanges: u64,
    /// Request and ACK frames written
    pub frames_sent: u64,
    pub frames_received: u64,
    pub acks_sent: u64,
    /// Exchanges that ended in a `FAILURE` status
    pub remote_failures: u64,
}

/// A live connection to one map server
pub struct Session {
    config: SessionConfig,
    peer: SocketAddr,

    /// `None` once closed or after a fatal error
    stream: TokioMutex<Option<TcpStream>>,

    /// Set once by `close`, never cleared
    closing: watch::Sender<bool>,

    stats: Mutex<SessionStats>,
}

fn closed_error() -> WeightMapError {
    WeightMapError::Connection("session closed".to_string())
}

async fn with_timeout<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(WeightMapError::Connection(format!("{}: {}", what, e))),
        Err(_) => Err(WeightMapError::Connection(format!(
            "{} timed out after {:?}",
            what, limit
        ))),
    }
}

/// Read exactly one frame
///
/// Returns `None` when the peer closes cleanly before the first byte.
async fn read_full_frame(stream: &mut TcpStream) -> io::Result<Option<Vec<u8>>> {
    let mut frame = vec![0u8; FRAME_SIZE];
    let mut filled = 0;
    while filled < FRAME_SIZE {
        let n = stream.read(&mut frame[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed after {} of {} frame bytes", filled, FRAME_SIZE),
            ));
        }
        filled += n;
    }
    Ok(Some(frame))
}

impl Session {
    /// Connect to `config.address`
    ///
    /// # Errors
    /// - `Config` if the configuration does not validate
    /// - `Connection` if the server refuses or the handshake times out
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        config.validate().map_err(WeightMapError::Config)?;

        debug!("Connecting to map server at {}", config.address);
        let what = format!("connect to {}", config.address);
        let stream = with_timeout(
            config.connect_timeout,
            &what,
            TcpStream::connect(config.address.as_str()),
        )
        .await?;

        Self::from_stream(stream, config)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, config: SessionConfig) -> Result<Self> {
        stream.set_nodelay(config.nodelay)?;

        if let Some(idle) = config.keepalive {
            let keepalive = socket2::TcpKeepalive::new().with_time(idle);
            socket2::SockRef::from(&stream).set_tcp_keepalive(&keepalive)?;
        }

        let peer = stream.peer_addr()?;
        info!("Connected to map server at {} (ack mode: {})", peer, config.ack_mode.name());

        Ok(Self {
            config,
            peer,
            stream: TokioMutex::new(Some(stream)),
            closing: watch::channel(false).0,
            stats: Mutex::new(SessionStats::default()),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot of the traffic counters
    pub fn stats(&self) -> SessionStats {
        *self.stats.lock()
    }

    pub async fn is_closed(&self) -> bool {
        self.stream.lock().await.is_none()
    }

    /// Send one request and assemble the full response
    ///
    /// The returned frame carries the terminal status and every payload byte
    /// received, padding included. Status interpretation is left to
    /// [`Session::call`].
    ///
    /// # Errors
    /// - `ProtocolOverflow` before anything is written if the payload does not fit
    /// - `Connection` on socket faults, timeouts, or a closed session
    pub async fn exchange(&self, opcode: Opcode, payload: &[u8]) -> Result<Frame> {
        let request = encode_request(opcode, payload)?;

        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(closed_error)?;

        debug!("Calling {} ({} payload bytes)", opcode, payload.len());
        let result = self.exchange_on(stream, &request).await;

        if let Err(err) = &result {
            if err.is_fatal_to_session() && !self.is_closing() {
                warn!("Dropping session to {} after {} failed: {}", self.peer, opcode, err);
                *guard = None;
            }
        }
        result
    }

    /// Send one request and return the payload of a successful response
    ///
    /// # Errors
    /// - `RemoteFailure` with the server's message on a `FAILURE` status
    /// - `Decode` on a status that is neither success nor failure
    /// - anything [`Session::exchange`] returns
    pub async fn call(&self, opcode: Opcode, payload: &[u8]) -> Result<Bytes> {
        let response = self.exchange(opcode, payload).await?;
        self.check_response(opcode, response)
    }

    /// Ask the server process to exit
    ///
    /// The server closes its socket without replying, so a clean EOF after the
    /// request counts as success. The session is closed afterwards.
    pub async fn close_remote_server(&self) -> Result<()> {
        let request = encode_request(Opcode::CloseServer, &[])?;

        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or_else(closed_error)?;

        let result = self.close_remote_on(stream, &request).await;
        match &result {
            Ok(()) => {
                info!("Map server at {} shut down", self.peer);
                *guard = None;
            }
            Err(err) if err.is_fatal_to_session() && !self.is_closing() => {
                warn!("Dropping session to {} after CLOSE_SERVER failed: {}", self.peer, err);
                *guard = None;
            }
            Err(_) => {}
        }
        result
    }

    /// Half-close the connection and wait for the server to hang up
    ///
    /// A call in flight on another task is aborted with
    /// `Connection("session closed")`. Idempotent. Every call after this
    /// fails the same way.
    pub async fn close(&self) -> Result<()> {
        self.closing.send_replace(true);

        let Some(mut stream) = self.stream.lock().await.take() else {
            debug!("Session to {} already closed", self.peer);
            return Ok(());
        };

        if let Err(e) = stream.shutdown().await {
            debug!("Write shutdown to {} failed: {}", self.peer, e);
        }

        let mut buf = vec![0u8; FRAME_SIZE];
        loop {
            let n = with_timeout(self.config.read_timeout, "drain on close", stream.read(&mut buf))
                .await?;
            if n == 0 {
                break;
            }
            trace!("Discarded {} bytes while closing", n);
        }

        info!("Closed session to {}", self.peer);
        Ok(())
    }

    fn is_closing(&self) -> bool {
        *self.closing.borrow()
    }

    /// Run `io` unless `close` is called first
    async fn unless_closing<T, F>(&self, io: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut closing = self.closing.subscribe();
        tokio::select! {
            biased;
            _ = async { closing.wait_for(|closing| *closing).await.map(|_| ()) } => {
                debug!("Aborting exchange with {}: session closing", self.peer);
                Err(closed_error())
            }
            result = io => result,
        }
    }

    async fn exchange_on(&self, stream: &mut TcpStream, request: &[u8]) -> Result<Frame> {
        trace!("Request header: {:02X?}", &request[..HEADER_SIZE]);
        self.write_frame(stream, request).await?;
        self.receive(stream, None).await
    }

    async fn close_remote_on(&self, stream: &mut TcpStream, request: &[u8]) -> Result<()> {
        self.write_frame(stream, request).await?;
        match self.read_frame(stream).await? {
            None => Ok(()),
            Some(first) => {
                let response = self.receive(stream, Some(first)).await?;
                self.check_response(Opcode::CloseServer, response).map(|_| ())
            }
        }
    }

    /// Run the continuation loop, starting from `pending` if a frame was already read
    async fn receive(&self, stream: &mut TcpStream, mut pending: Option<Vec<u8>>) -> Result<Frame> {
        // Placeholder for the terminal status
        let mut assembled = BytesMut::with_capacity(FRAME_SIZE);
        assembled.put_bytes(0, HEADER_SIZE);

        let mut frames = 0usize;
        loop {
            let frame = match pending.take() {
                Some(frame) => frame,
                None => self.read_frame(stream).await?.ok_or_else(|| {
                    WeightMapError::Connection(
                        "server closed the connection mid-exchange".to_string(),
                    )
                })?,
            };
            frames += 1;

            let header = read_header(&frame)?;
            assembled.extend_from_slice(&frame[HEADER_SIZE..]);
            trace!("Frame {} status {}", frames, header);

            let more = ResponseStatus::from_i32(header).is_some_and(|s| !s.is_terminal());
            if more || self.config.ack_mode == AckMode::EveryFrame {
                self.write_frame(stream, &ack_frame()).await?;
                self.stats.lock().acks_sent += 1;
            }

            if !more {
                assembled[..HEADER_SIZE].copy_from_slice(&frame[..HEADER_SIZE]);
                break;
            }
        }

        self.stats.lock().exchanges += 1;
        debug!("Assembled response from {} frame(s), {} bytes", frames, assembled.len());
        Frame::parse(&assembled)
    }

    fn check_response(&self, opcode: Opcode, response: Frame) -> Result<Bytes> {
        match response.status() {
            Some(status) if status.is_success() => Ok(response.payload),
            Some(ResponseStatus::Failure) => {
                let message = read_ascii(&response.payload)
                    .unwrap_or_else(|_| "undecodable error".to_string());
                self.stats.lock().remote_failures += 1;
                warn!("{} failed on server: {}", opcode, message);
                Err(WeightMapError::RemoteFailure(message))
            }
            _ => Err(WeightMapError::Decode(format!(
                "unexpected response status {} for {}",
                response.header, opcode
            ))),
        }
    }

    async fn read_frame(&self, stream: &mut TcpStream) -> Result<Option<Vec<u8>>> {
        let read = with_timeout(self.config.read_timeout, "read frame", read_full_frame(stream));
        let frame = self.unless_closing(read).await?;
        if frame.is_some() {
            self.stats.lock().frames_received += 1;
        }
        Ok(frame)
    }

    async fn write_frame(&self, stream: &mut TcpStream, frame: &[u8]) -> Result<()> {
        let write = with_timeout(self.config.write_timeout, "write frame", stream.write_all(frame));
        self.unless_closing(write).await?;
        self.stats.lock().frames_sent += 1;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("peer", &self.peer)
            .field("ack_mode", &self.config.ack_mode)
            .field("stats", &self.stats())
            .finish()
    }
}
