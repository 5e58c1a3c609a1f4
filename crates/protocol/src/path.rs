//! Path payloads and path decompression
//!
//! Path responses list turn points as server indices:
//!
//! ```text
//! {i32 count}{u16 x}{u16 y} ... count times
//! ```
//!
//! The server sends only segment endpoints. [`decompress_path`] walks each
//! segment in exact integer steps to recover the lattice points between them.

use weightmap_core::{Path, Point, Result, WeightMapError};

use crate::codecs::{read_i32, read_u16};

/// Decode a path payload into server-index points
pub fn decode_path(payload: &[u8]) -> Result<Path> {
    let mut buf = payload;
    let count = read_i32(&mut buf)?;
    if count < 0 {
        return Err(WeightMapError::Decode(format!("negative path length: {}", count)));
    }

    let count = count as usize;
    if buf.len() < count * 4 {
        return Err(WeightMapError::Decode(format!(
            "truncated path: {} points need {} bytes, have {}",
            count,
            count * 4,
            buf.len()
        )));
    }

    let mut path = Vec::with_capacity(count);
    for _ in 0..count {
        let x = read_u16(&mut buf)?;
        let y = read_u16(&mut buf)?;
        path.push(Point::new(x as i32, y as i32));
    }
    Ok(path)
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

/// Expand segment endpoints into every step along each segment
///
/// Each segment's slope `dy/dx` is reduced to lowest terms and the walk adds
/// the reduced `(dx, dy)` until it lands on the segment's end, which exact
/// integer arithmetic guarantees. A segment with `dx == 0` has no defined
/// slope and is rejected.
pub fn decompress_path(path: &[Point]) -> Result<Path> {
    let Some(first) = path.first() else {
        return Ok(Vec::new());
    };

    let mut out = vec![*first];
    for (i, pair) in path.windows(2).enumerate() {
        let (prev, curr) = (pair[0], pair[1]);
        let dx = curr.x as i64 - prev.x as i64;
        let dy = curr.y as i64 - prev.y as i64;

        if dx == 0 {
            return Err(WeightMapError::MalformedPath(format!(
                "segment {} from ({}, {}) to ({}, {}) has dx = 0",
                i, prev.x, prev.y, curr.x, curr.y
            )));
        }

        let g = gcd(dx, dy);
        let (step_x, step_y) = (dx / g, dy / g);

        let (mut x, mut y) = (prev.x as i64, prev.y as i64);
        for _ in 0..g {
            x += step_x;
            y += step_y;
            out.push(Point::new(x as i32, y as i32));
        }
    }
    Ok(out)
}
