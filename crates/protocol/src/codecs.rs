//! Argument and payload codecs
//!
//! All integers are little-endian. Request arguments are either 4-byte signed
//! integers or 8-byte IEEE-754 doubles; response payloads are read with the
//! `read_*` helpers, which never index past the end of the buffer.

use bytes::{Buf, BufMut, BytesMut};
use weightmap_core::{Result, WeightMapError};

/// One argument to a remote call, before encoding
///
/// `Null` arguments are skipped by every encoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg {
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Arg {
    /// Cast to the 4-byte integer the `int-cast` encoder writes
    ///
    /// Booleans become 0/1 and floats truncate toward zero.
    pub fn as_i32(&self) -> Result<Option<i32>> {
        match *self {
            Arg::Int(v) => i32::try_from(v).map(Some).map_err(|_| {
                WeightMapError::InvalidArgument(format!("{} does not fit in an i32", v))
            }),
            Arg::Float(v) => {
                let t = v.trunc();
                if !t.is_finite() || t < i32::MIN as f64 || t > i32::MAX as f64 {
                    return Err(WeightMapError::InvalidArgument(format!(
                        "{} cannot be cast to an i32",
                        v
                    )));
                }
                Ok(Some(t as i32))
            }
            Arg::Bool(b) => Ok(Some(b as i32)),
            Arg::Null => Ok(None),
        }
    }

    /// Value the `float64` encoder writes
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Arg::Int(v) => Some(v as f64),
            Arg::Float(v) => Some(v),
            Arg::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
            Arg::Null => None,
        }
    }
}

impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<u16> for Arg {
    fn from(v: u16) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Arg::Null)
    }
}

/// Write each non-null argument as an `i32`
pub fn write_int_args(buf: &mut BytesMut, args: &[Arg]) -> Result<()> {
    for arg in args {
        if let Some(v) = arg.as_i32()? {
            buf.put_i32_le(v);
        }
    }
    Ok(())
}

/// Write each non-null argument as an `f64`
pub fn write_float_args(buf: &mut BytesMut, args: &[Arg]) {
    for arg in args {
        if let Some(v) = arg.as_f64() {
            buf.put_f64_le(v);
        }
    }
}

#[inline]
fn ensure(buf: &[u8], needed: usize, what: &str) -> Result<()> {
    if buf.len() < needed {
        return Err(WeightMapError::Decode(format!(
            "not enough bytes for {}: need {}, have {}",
            what,
            needed,
            buf.len()
        )));
    }
    Ok(())
}

#[inline]
pub fn read_u16(buf: &mut &[u8]) -> Result<u16> {
    ensure(*buf, 2, "u16")?;
    Ok(buf.get_u16_le())
}

#[inline]
pub fn read_i32(buf: &mut &[u8]) -> Result<i32> {
    ensure(*buf, 4, "i32")?;
    Ok(buf.get_i32_le())
}

#[inline]
pub fn read_u32(buf: &mut &[u8]) -> Result<u32> {
    ensure(*buf, 4, "u32")?;
    Ok(buf.get_u32_le())
}

#[inline]
pub fn read_f64(buf: &mut &[u8]) -> Result<f64> {
    ensure(*buf, 8, "f64")?;
    Ok(buf.get_f64_le())
}

/// Decode ASCII text, dropping trailing NUL padding
pub fn read_ascii(buf: &[u8]) -> Result<String> {
    let end = buf.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    let text = &buf[..end];
    if !text.is_ascii() {
        return Err(WeightMapError::Decode("payload is not ASCII text".into()));
    }
    // ASCII is valid UTF-8
    Ok(String::from_utf8_lossy(text).into_owned())
}
