//! Weight grid decoding
//!
//! `GET_WEIGHTS` answers with a zlib stream laid out as:
//!
//! ```text
//! {u16 width}{u16 height}{u16 weight * width * height}
//! ```
//!
//! Weights are row-major (y outer, x inner) and all values little-endian.

use serde::Serialize;
use weightmap_core::{Result, WeightMapError};

use crate::codecs::read_u16;
use crate::compression::decompress;

/// Per-cell traversal cost, indexed `[x][y]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightGrid {
    width: usize,
    height: usize,
    /// Column-major storage so `columns[x][y]` matches the server's indexing
    columns: Vec<Vec<u16>>,
}

impl WeightGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            columns: vec![vec![0; height]; width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u16> {
        self.columns.get(x).and_then(|col| col.get(y)).copied()
    }

    /// All weights along one x index
    pub fn column(&self, x: usize) -> Option<&[u16]> {
        self.columns.get(x).map(Vec::as_slice)
    }

    pub fn max_weight(&self) -> Option<u16> {
        self.columns.iter().flatten().copied().max()
    }
}

impl std::ops::Index<(usize, usize)> for WeightGrid {
    type Output = u16;

    fn index(&self, (x, y): (usize, usize)) -> &u16 {
        &self.columns[x][y]
    }
}

/// Decode an already-decompressed grid stream
pub fn parse_grid(data: &[u8]) -> Result<WeightGrid> {
    let mut buf = data;
    let width = read_u16(&mut buf)? as usize;
    let height = read_u16(&mut buf)? as usize;

    let needed = 2 * width * height;
    if buf.len() < needed {
        return Err(WeightMapError::Decode(format!(
            "truncated grid: {}x{} needs {} weight bytes, have {}",
            width,
            height,
            needed,
            buf.len()
        )));
    }

    let mut grid = WeightGrid::new(width, height);
    for y in 0..height {
        for x in 0..width {
            grid.columns[x][y] = read_u16(&mut buf)?;
        }
    }
    Ok(grid)
}

/// Decompress and decode a `GET_WEIGHTS` payload
pub fn decode_grid(payload: &[u8]) -> Result<WeightGrid> {
    let data = decompress(payload)?;
    let grid = parse_grid(&data)?;
    tracing::debug!(
        "Decoded {}x{} weight grid ({} compressed bytes)",
        grid.width(),
        grid.height(),
        payload.len()
    );
    Ok(grid)
}
