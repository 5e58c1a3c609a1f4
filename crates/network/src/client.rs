//! # Weight Map Client
//!
//! Typed operations over a [`Session`], with every coordinate-bearing call
//! translated between caller space and server indices.
//!
//! # Coordinates
//!
//! The server indexes cells from the top-left corner. Callers place `y = 0`
//! on the vertical center of the grid. The server height is queried once at
//! connect and fixes the translation for the life of the client.
//!
//! # Example
//!
//! ```no_run
//! use weightmap_network::{MapService, SessionConfig, WeightMapClient};
//! use weightmap_core::Point;
//!
//! # async fn demo() -> weightmap_core::Result<()> {
//! let client = WeightMapClient::connect(SessionConfig::new("localhost:8080")).await?;
//! client.add_obstacle(20, 0, 5, 90, true).await?;
//! let path = client.get_path(0, 0, 40, 10).await?;
//! println!("{} turn points", path.len());
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::ops::Range;
use tracing::debug;
use weightmap_core::{
    BorderPlacement, CoordinateTranslator, Orientation, Path, Point, Result, WeightMapError,
};
use weightmap_protocol::{decompress_path, Arg, MethodRegistry, Opcode, Value, WeightGrid};

use crate::config::SessionConfig;
use crate::session::Session;

/// Operations a weight map server offers, in caller coordinates
///
/// Collaborators (pose trackers, lidar ingest, planners) depend on this trait
/// rather than on the TCP client.
#[async_trait]
pub trait MapService: Send + Sync {
    /// Raise the weight of a band `width` cells wide along the given edges
    async fn add_border(&self, width: i32, weight: i32, placement: BorderPlacement) -> Result<()>;

    /// Add a circular obstacle, fading linearly toward its edge when `gradient` is set
    async fn add_obstacle(&self, x: i32, y: i32, radius: i32, weight: i32, gradient: bool)
        -> Result<()>;

    /// Least-cost path as segment endpoints
    async fn get_path(&self, src_x: i32, src_y: i32, dst_x: i32, dst_y: i32) -> Result<Path>;

    /// Path from the server's stored position
    async fn path_to(&self, dst_x: i32, dst_y: i32) -> Result<Path>;

    /// Path from `(x, y)` to any cell on the column `target_x`
    async fn path_to_line(&self, x: i32, y: i32, target_x: i32) -> Result<Path>;

    async fn get_width(&self) -> Result<u32>;
    async fn get_height(&self) -> Result<u32>;
    async fn get_min_weight(&self) -> Result<u32>;
    async fn get_max_weight(&self) -> Result<u32>;
    async fn get_max_weight_in_map(&self) -> Result<u32>;

    async fn set_weight(&self, x: i32, y: i32, weight: i32) -> Result<()>;
    async fn get_weight(&self, x: i32, y: i32) -> Result<u32>;

    /// Reset every cell to the minimum weight
    async fn reset_map(&self) -> Result<()>;

    /// Full grid, indexed by server indices
    async fn get_weights(&self) -> Result<WeightGrid>;

    /// Server-rendered text dump of the grid
    async fn to_string(&self) -> Result<String>;

    async fn set_position(&self, x: i32, y: i32) -> Result<()>;
    async fn get_position(&self) -> Result<Point>;

    async fn get_orientation(&self) -> Result<Orientation>;
    async fn set_orientation(&self, orientation: Orientation) -> Result<()>;

    /// Half-close and release the connection
    async fn close(&self) -> Result<()>;

    /// Shut the server process down
    async fn close_remote_server(&self) -> Result<()>;
}

/// TCP implementation of [`MapService`]
#[derive(Debug)]
pub struct WeightMapClient {
    session: Session,
    registry: MethodRegistry,
    translator: CoordinateTranslator,
}

impl WeightMapClient {
    /// Connect with the standard method registry
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let session = Session::connect(config).await?;
        Self::from_session(session, MethodRegistry::standard()).await
    }

    /// Build a client on an open session, querying the server height
    pub async fn from_session(session: Session, registry: MethodRegistry) -> Result<Self> {
        let payload = session.call(Opcode::GetHeight, &[]).await?;
        let height = expect_uint(registry.decode(Opcode::GetHeight, &payload)?)?;
        debug!("Server height is {}", height);

        Ok(Self {
            session,
            registry,
            translator: CoordinateTranslator::new(height),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub fn translator(&self) -> CoordinateTranslator {
        self.translator
    }

    /// Encode `args`, run one exchange, decode the response
    ///
    /// No coordinate translation happens here. An opcode missing from the
    /// registry fails with `UnknownOperation` before anything is sent.
    pub async fn invoke(&self, opcode: Opcode, args: &[Arg]) -> Result<Value> {
        let entry = self.registry.lookup(opcode)?;
        let payload = entry.encoder.encode(args)?;
        let response = self.session.call(opcode, &payload).await?;
        entry.decoder.decode(&response)
    }

    async fn invoke_unit(&self, opcode: Opcode, args: &[Arg]) -> Result<()> {
        self.invoke(opcode, args).await.map(|_| ())
    }

    async fn invoke_uint(&self, opcode: Opcode, args: &[Arg]) -> Result<u32> {
        expect_uint(self.invoke(opcode, args).await?)
    }

    async fn invoke_path(&self, opcode: Opcode, args: &[Arg]) -> Result<Path> {
        match self.invoke(opcode, args).await? {
            Value::Path(path) => self.translator.path_to_caller(&path),
            other => Err(mismatch("path", &other)),
        }
    }

    fn index_of(&self, x: i32, y: i32) -> Result<Point> {
        self.translator.to_index(Point::new(x, y))
    }

    /// [`MapService::get_path`] expanded to every unit step
    pub async fn get_dense_path(
        &self,
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
    ) -> Result<Path> {
        let path = self.get_path(src_x, src_y, dst_x, dst_y).await?;
        decompress_path(&path)
    }

    /// Apply `(x, y, weight)` triples in order, stopping at the first error
    pub async fn set_weights(&self, cells: &[(i32, i32, i32)]) -> Result<()> {
        for &(x, y, weight) in cells {
            self.set_weight(x, y, weight).await?;
        }
        Ok(())
    }

    /// Every valid caller x
    pub async fn x_range(&self) -> Result<Range<i32>> {
        let width = self.get_width().await?;
        Ok(0..i32::try_from(width).unwrap_or(i32::MAX))
    }

    /// Caller y values covering the grid
    ///
    /// Ends one short of the last row, matching the reference client.
    pub fn y_range(&self) -> Range<i32> {
        let (top, bottom) = self.translator.caller_rows();
        let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        clamp(top)..clamp(bottom - 1)
    }
}

fn mismatch(expected: &str, got: &Value) -> WeightMapError {
    WeightMapError::Decode(format!("expected {} response, got {}", expected, got.kind()))
}

fn expect_uint(value: Value) -> Result<u32> {
    match value {
        Value::UInt(v) => Ok(v),
        other => Err(mismatch("single-int", &other)),
    }
}

#[async_trait]
impl MapService for WeightMapClient {
    async fn add_border(&self, width: i32, weight: i32, placement: BorderPlacement) -> Result<()> {
        self.invoke_unit(
            Opcode::AddBorder,
            &[width.into(), weight.into(), placement.bits().into()],
        )
        .await
    }

    async fn add_obstacle(
        &self,
        x: i32,
        y: i32,
        radius: i32,
        weight: i32,
        gradient: bool,
    ) -> Result<()> {
        let at = self.index_of(x, y)?;
        self.invoke_unit(
            Opcode::AddObstacle,
            &[at.x.into(), at.y.into(), radius.into(), weight.into(), gradient.into()],
        )
        .await
    }

    async fn get_path(&self, src_x: i32, src_y: i32, dst_x: i32, dst_y: i32) -> Result<Path> {
        let src = self.index_of(src_x, src_y)?;
        let dst = self.index_of(dst_x, dst_y)?;
        self.invoke_path(
            Opcode::GetPath,
            &[src.x.into(), src.y.into(), dst.x.into(), dst.y.into()],
        )
        .await
    }

    async fn path_to(&self, dst_x: i32, dst_y: i32) -> Result<Path> {
        let dst = self.index_of(dst_x, dst_y)?;
        self.invoke_path(Opcode::PathTo, &[dst.x.into(), dst.y.into()]).await
    }

    async fn path_to_line(&self, x: i32, y: i32, target_x: i32) -> Result<Path> {
        let start = self.index_of(x, y)?;
        self.invoke_path(
            Opcode::PathToLine,
            &[start.x.into(), start.y.into(), target_x.into()],
        )
        .await
    }

    async fn get_width(&self) -> Result<u32> {
        self.invoke_uint(Opcode::GetWidth, &[]).await
    }

    async fn get_height(&self) -> Result<u32> {
        self.invoke_uint(Opcode::GetHeight, &[]).await
    }

    async fn get_min_weight(&self) -> Result<u32> {
        self.invoke_uint(Opcode::GetMinWeight, &[]).await
    }

    async fn get_max_weight(&self) -> Result<u32> {
        self.invoke_uint(Opcode::GetMaxWeight, &[]).await
    }

    async fn get_max_weight_in_map(&self) -> Result<u32> {
        self.invoke_uint(Opcode::GetMaxWeightInMap, &[]).await
    }

    async fn set_weight(&self, x: i32, y: i32, weight: i32) -> Result<()> {
        let at = self.index_of(x, y)?;
        self.invoke_unit(Opcode::SetWeight, &[at.x.into(), at.y.into(), weight.into()])
            .await
    }

    async fn get_weight(&self, x: i32, y: i32) -> Result<u32> {
        let at = self.index_of(x, y)?;
        self.invoke_uint(Opcode::GetWeight, &[at.x.into(), at.y.into()]).await
    }

    async fn reset_map(&self) -> Result<()> {
        self.invoke_unit(Opcode::ResetMap, &[]).await
    }

    async fn get_weights(&self) -> Result<WeightGrid> {
        match self.invoke(Opcode::GetWeights, &[]).await? {
            Value::Grid(grid) => Ok(grid),
            other => Err(mismatch("grid", &other)),
        }
    }

    async fn to_string(&self) -> Result<String> {
        match self.invoke(Opcode::GetString, &[]).await? {
            Value::Text(text) => Ok(text),
            other => Err(mismatch("string", &other)),
        }
    }

    async fn set_position(&self, x: i32, y: i32) -> Result<()> {
        let at = self.index_of(x, y)?;
        self.invoke_unit(Opcode::SetPos, &[at.x.into(), at.y.into()]).await
    }

    async fn get_position(&self) -> Result<Point> {
        match self.invoke(Opcode::GetPos, &[]).await? {
            Value::IntPair(x, y) => self.translator.to_caller(Point::new(x, y)),
            other => Err(mismatch("double-int", &other)),
        }
    }

    async fn get_orientation(&self) -> Result<Orientation> {
        match self.invoke(Opcode::GetRollPitchYaw, &[]).await? {
            Value::Triple(roll, pitch, yaw) => Ok(Orientation::new(roll, pitch, yaw)),
            other => Err(mismatch("triple-float64", &other)),
        }
    }

    async fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.invoke_unit(
            Opcode::SetRollPitchYaw,
            &[orientation.roll.into(), orientation.pitch.into(), orientation.yaw.into()],
        )
        .await
    }

    async fn close(&self) -> Result<()> {
        self.session.close().await
    }

    async fn close_remote_server(&self) -> Result<()> {
        self.registry.lookup(Opcode::CloseServer)?;
        self.session.close_remote_server().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use weightmap_protocol::compression::compress;
    use weightmap_protocol::{
        encode_frame, read_header, ResponseStatus, FRAME_SIZE, HEADER_SIZE, PAYLOAD_CAPACITY,
    };

    type Requests = Arc<Mutex<Vec<(Opcode, Vec<u8>)>>>;

    const HEIGHT: u32 = 100;

    /// Split `body` into CONTINUE frames plus one terminal frame
    fn reply(status: i32, body: &[u8]) -> Vec<Vec<u8>> {
        let mut chunks: Vec<&[u8]> = body.chunks(PAYLOAD_CAPACITY).collect();
        let last = chunks.pop().unwrap_or(&[]);
        let mut frames: Vec<Vec<u8>> = chunks
            .into_iter()
            .map(|chunk| encode_frame(3, chunk).unwrap().to_vec())
            .collect();
        frames.push(encode_frame(status, last).unwrap().to_vec());
        frames
    }

    fn ok(body: &[u8]) -> Vec<Vec<u8>> {
        reply(0, body)
    }

    fn ints(payload: &[u8], n: usize) -> Vec<i32> {
        payload
            .chunks_exact(4)
            .take(n)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    fn path_body(points: &[(u16, u16)]) -> Vec<u8> {
        let mut body = (points.len() as i32).to_le_bytes().to_vec();
        for (x, y) in points {
            body.extend_from_slice(&x.to_le_bytes());
            body.extend_from_slice(&y.to_le_bytes());
        }
        body
    }

    /// Scripted map server answering GET_HEIGHT with 100 and everything else via `handler`
    async fn fake_server<F>(handler: F) -> (SessionConfig, Requests)
    where
        F: Fn(Opcode, &[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = SessionConfig::new(listener.local_addr().unwrap().to_string());
        let requests: Requests = Arc::default();
        let log = requests.clone();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; FRAME_SIZE];
            while socket.read_exact(&mut buf).await.is_ok() {
                let opcode = Opcode::from_i32(read_header(&buf).unwrap()).unwrap();
                let args = &buf[HEADER_SIZE..];
                log.lock().push((opcode, args.to_vec()));

                let frames = match opcode {
                    Opcode::GetHeight => ok(&HEIGHT.to_le_bytes()),
                    _ => handler(opcode, args),
                };
                for frame in frames {
                    socket.write_all(&frame).await.unwrap();
                    if read_header(&frame).unwrap() == ResponseStatus::Continue.as_i32() {
                        let mut ack = vec![0u8; FRAME_SIZE];
                        socket.read_exact(&mut ack).await.unwrap();
                    }
                }
            }
        });

        (config, requests)
    }

    fn last_request(requests: &Requests) -> (Opcode, Vec<u8>) {
        requests.lock().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_connect_queries_height() {
        let (config, requests) = fake_server(|_, _| ok(&[])).await;
        let client = WeightMapClient::connect(config).await.unwrap();

        assert_eq!(client.translator().server_height(), HEIGHT);
        assert_eq!(requests.lock()[0].0, Opcode::GetHeight);
        assert_eq!(client.y_range(), -50..49);
    }

    #[tokio::test]
    async fn test_get_path_translates_both_ways() {
        let (config, requests) = fake_server(|opcode, _| {
            assert_eq!(opcode, Opcode::GetPath);
            ok(&path_body(&[(0, 50), (10, 60)]))
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let path = client.get_path(0, 0, 10, 10).await.unwrap();
        assert_eq!(path, vec![Point::new(0, 0), Point::new(10, 10)]);

        let (_, args) = last_request(&requests);
        assert_eq!(ints(&args, 5), vec![0, 50, 10, 60, 0]);
    }

    #[tokio::test]
    async fn test_path_to_arguments_and_result() {
        let (config, requests) = fake_server(|opcode, _| {
            assert_eq!(opcode, Opcode::PathTo);
            ok(&path_body(&[(2, 45), (12, 30)]))
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let path = client.path_to(12, -20).await.unwrap();
        assert_eq!(path, vec![Point::new(2, -5), Point::new(12, -20)]);

        let (opcode, args) = last_request(&requests);
        assert_eq!(opcode, Opcode::PathTo);
        assert_eq!(ints(&args, 3), vec![12, 30, 0]);
    }

    #[tokio::test]
    async fn test_path_to_line_keeps_target_column() {
        let (config, requests) = fake_server(|opcode, _| {
            assert_eq!(opcode, Opcode::PathToLine);
            ok(&path_body(&[(5, 60), (80, 50), (269, 50)]))
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let path = client.path_to_line(5, 10, 269).await.unwrap();
        assert_eq!(
            path,
            vec![Point::new(5, 10), Point::new(80, 0), Point::new(269, 0)]
        );

        let (opcode, args) = last_request(&requests);
        assert_eq!(opcode, Opcode::PathToLine);
        // only the start row moves; the target is an x column
        assert_eq!(ints(&args, 4), vec![5, 60, 269, 0]);
    }

    #[tokio::test]
    async fn test_extreme_y_fails_before_sending() {
        let (config, requests) = fake_server(|_, _| ok(&1u32.to_le_bytes())).await;
        let client = WeightMapClient::connect(config).await.unwrap();
        let before = requests.lock().len();

        let err = client.get_weight(0, i32::MAX).await.unwrap_err();
        assert!(matches!(err, WeightMapError::InvalidArgument(_)));
        assert!(client.set_weight(0, i32::MAX - 49, 5).await.is_err());
        assert!(client.get_path(0, 0, 0, i32::MAX).await.is_err());
        assert!(client.path_to_line(0, i32::MAX, 10).await.is_err());
        assert_eq!(requests.lock().len(), before);

        // the session is untouched
        assert_eq!(client.get_weight(0, i32::MAX - 50).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dense_path() {
        let (config, _) =
            fake_server(|_, _| ok(&path_body(&[(0, 50), (3, 53), (5, 53)]))).await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let dense = client.get_dense_path(0, 0, 5, 3).await.unwrap();
        let expected: Path = [(0, 0), (1, 1), (2, 2), (3, 3), (4, 3), (5, 3)]
            .into_iter()
            .map(Point::from)
            .collect();
        assert_eq!(dense, expected);
    }

    #[tokio::test]
    async fn test_obstacle_and_border_arguments() {
        let (config, requests) = fake_server(|_, _| ok(&[])).await;
        let client = WeightMapClient::connect(config).await.unwrap();

        client.add_obstacle(4, -10, 3, 80, true).await.unwrap();
        let (opcode, args) = last_request(&requests);
        assert_eq!(opcode, Opcode::AddObstacle);
        assert_eq!(ints(&args, 5), vec![4, 40, 3, 80, 1]);

        client
            .add_border(2, 9, BorderPlacement::TOP | BorderPlacement::LEFT)
            .await
            .unwrap();
        let (opcode, args) = last_request(&requests);
        assert_eq!(opcode, Opcode::AddBorder);
        // border arguments carry no coordinates
        assert_eq!(ints(&args, 3), vec![2, 9, 9]);
    }

    #[tokio::test]
    async fn test_position_round_trip() {
        let (config, requests) = fake_server(|opcode, _| match opcode {
            Opcode::GetPos => {
                let mut body = 7i32.to_le_bytes().to_vec();
                body.extend_from_slice(&45i32.to_le_bytes());
                ok(&body)
            }
            _ => ok(&[]),
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        client.set_position(7, -5).await.unwrap();
        assert_eq!(ints(&last_request(&requests).1, 2), vec![7, 45]);
        assert_eq!(client.get_position().await.unwrap(), Point::new(7, -5));
    }

    #[tokio::test]
    async fn test_orientation_exact_doubles() {
        let stored = Arc::new(Mutex::new(Vec::new()));
        let store = stored.clone();
        let (config, _) = fake_server(move |opcode, args| match opcode {
            Opcode::SetRollPitchYaw => {
                *store.lock() = args[..24].to_vec();
                ok(&[])
            }
            Opcode::GetRollPitchYaw => ok(&store.lock()),
            _ => reply(1, b"unexpected"),
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let sent = Orientation::new(0.1 + 0.2, -1.5e-300, std::f64::consts::E);
        client.set_orientation(sent).await.unwrap();
        let got = client.get_orientation().await.unwrap();
        assert_eq!(got.roll.to_bits(), sent.roll.to_bits());
        assert_eq!(got.pitch.to_bits(), sent.pitch.to_bits());
        assert_eq!(got.yaw.to_bits(), sent.yaw.to_bits());
    }

    #[tokio::test]
    async fn test_weights_over_several_frames() {
        let (width, height) = (48u16, 40u16);
        let mut raw = width.to_le_bytes().to_vec();
        raw.extend_from_slice(&height.to_le_bytes());
        let mut state = 12345u32;
        for _ in 0..(width as usize * height as usize) {
            // xorshift keeps the stream incompressible enough to span frames
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            raw.extend_from_slice(&((state % 1000) as u16).to_le_bytes());
        }
        let expected = weightmap_protocol::grid::parse_grid(&raw).unwrap();
        let compressed = compress(&raw).unwrap();
        assert!(compressed.len() > PAYLOAD_CAPACITY);

        let (config, _) = fake_server(move |_, _| ok(&compressed)).await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let grid = client.get_weights().await.unwrap();
        assert_eq!(grid, expected);
        assert!(client.session().stats().acks_sent >= 1);
    }

    #[tokio::test]
    async fn test_to_string_spanning_frames() {
        let mut text = vec![b'1'; PAYLOAD_CAPACITY];
        text.extend_from_slice(b" 9\n");
        let body = text.clone();
        let (config, _) = fake_server(move |_, _| ok(&body)).await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let rendered = client.to_string().await.unwrap();
        assert_eq!(rendered.as_bytes(), &text[..]);
    }

    #[tokio::test]
    async fn test_debug_print_is_unknown_operation() {
        let (config, requests) = fake_server(|_, _| ok(&[])).await;
        let client = WeightMapClient::connect(config).await.unwrap();
        let before = requests.lock().len();

        let err = client.invoke(Opcode::DebugPrint, &[]).await.unwrap_err();
        assert!(matches!(err, WeightMapError::UnknownOperation(_)));

        // the socket stays usable and saw nothing from the failed call
        client.reset_map().await.unwrap();
        assert_eq!(requests.lock().len(), before + 1);
    }

    #[tokio::test]
    async fn test_set_weights_stops_at_first_failure() {
        let (config, requests) = fake_server(|_, args| {
            if ints(args, 3)[2] < 0 {
                reply(1, b"weight out of range")
            } else {
                ok(&[])
            }
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        let err = client
            .set_weights(&[(0, 0, 5), (1, 0, -1), (2, 0, 5)])
            .await
            .unwrap_err();
        assert!(matches!(err, WeightMapError::RemoteFailure(ref m) if m == "weight out of range"));

        let set_calls = requests
            .lock()
            .iter()
            .filter(|(opcode, _)| *opcode == Opcode::SetWeight)
            .count();
        assert_eq!(set_calls, 2);
    }

    #[tokio::test]
    async fn test_scalar_accessors() {
        let (config, _) = fake_server(|opcode, args| match opcode {
            Opcode::GetWidth => ok(&270u32.to_le_bytes()),
            Opcode::GetWeight => {
                let at = ints(args, 2);
                ok(&((at[0] + at[1]) as u32).to_le_bytes())
            }
            _ => ok(&1u32.to_le_bytes()),
        })
        .await;
        let client = WeightMapClient::connect(config).await.unwrap();

        assert_eq!(client.get_width().await.unwrap(), 270);
        assert_eq!(client.x_range().await.unwrap(), 0..270);
        assert_eq!(client.get_height().await.unwrap(), HEIGHT);
        assert_eq!(client.get_weight(3, -50).await.unwrap(), 3);
        assert_eq!(client.get_max_weight_in_map().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_then_call_fails() {
        let (config, _) = fake_server(|_, _| ok(&[])).await;
        let client = WeightMapClient::connect(config).await.unwrap();

        client.close().await.unwrap();
        let err = client.get_width().await.unwrap_err();
        assert!(err.is_fatal_to_session());
    }

    #[tokio::test]
    async fn test_trait_object() {
        let (config, _) = fake_server(|_, _| ok(&5u32.to_le_bytes())).await;
        let service: Box<dyn MapService> =
            Box::new(WeightMapClient::connect(config).await.unwrap());
        assert_eq!(service.get_min_weight().await.unwrap(), 5);
    }
}
