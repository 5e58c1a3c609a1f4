//! # Method Registry
//!
//! Maps each [`Opcode`] to the encoder that turns call arguments into request
//! payload bytes and the decoder that turns the assembled response payload
//! into a typed [`Value`].
//!
//! # Dispatch
//!
//! - O(1) lookup via `HashMap`
//! - Encoders and decoders are plain enums, no dynamic dispatch
//! - An opcode without an entry is `UnknownOperation`, raised before any
//!   bytes reach the socket
//!
//! # Example
//!
//! ```
//! use weightmap_protocol::{Arg, MethodRegistry, Opcode, Value};
//!
//! let registry = MethodRegistry::standard();
//! let payload = registry.encode(Opcode::GetWeight, &[Arg::Int(3), Arg::Int(4)]).unwrap();
//! assert_eq!(payload.len(), 8);
//!
//! let value = registry.decode(Opcode::GetWidth, &270u32.to_le_bytes()).unwrap();
//! assert_eq!(value, Value::UInt(270));
//! ```

use bytes::BytesMut;
use std::collections::HashMap;
use weightmap_core::{Path, Result, WeightMapError};

use crate::codecs::{read_ascii, read_f64, read_i32, read_u32, write_float_args, write_int_args, Arg};
use crate::grid::{decode_grid, WeightGrid};
use crate::packets::Opcode;
use crate::path::decode_path;

/// Request payload encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    /// Ignores the arguments
    None,
    /// Each non-null argument as a 4-byte signed integer
    IntCast,
    /// Each non-null argument as an 8-byte double
    Float64,
}

impl Encoder {
    pub fn encode(self, args: &[Arg]) -> Result<BytesMut> {
        let mut buf = BytesMut::new();
        match self {
            Encoder::None => {}
            Encoder::IntCast => write_int_args(&mut buf, args)?,
            Encoder::Float64 => write_float_args(&mut buf, args),
        }
        Ok(buf)
    }
}

/// Response payload decoders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Produces no value
    None,
    /// First 4 bytes as an unsigned integer
    SingleInt,
    /// First 24 bytes as three doubles
    TripleFloat64,
    /// First 8 bytes as two signed integers
    DoubleInt,
    /// ASCII text with trailing NULs stripped
    String,
    /// Point count followed by `u16` index pairs
    Path,
    /// zlib-compressed weight grid
    Grid,
}

/// A decoded response
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    UInt(u32),
    Triple(f64, f64, f64),
    IntPair(i32, i32),
    Text(String),
    Path(Path),
    Grid(WeightGrid),
}

impl Value {
    /// Short name of the variant, for mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::UInt(_) => "single-int",
            Value::Triple(..) => "triple-float64",
            Value::IntPair(..) => "double-int",
            Value::Text(_) => "string",
            Value::Path(_) => "path",
            Value::Grid(_) => "grid",
        }
    }
}

impl Decoder {
    pub fn decode(self, payload: &[u8]) -> Result<Value> {
        let mut buf = payload;
        match self {
            Decoder::None => Ok(Value::None),
            Decoder::SingleInt => Ok(Value::UInt(read_u32(&mut buf)?)),
            Decoder::TripleFloat64 => {
                let a = read_f64(&mut buf)?;
                let b = read_f64(&mut buf)?;
                let c = read_f64(&mut buf)?;
                Ok(Value::Triple(a, b, c))
            }
            Decoder::DoubleInt => {
                let a = read_i32(&mut buf)?;
                let b = read_i32(&mut buf)?;
                Ok(Value::IntPair(a, b))
            }
            Decoder::String => Ok(Value::Text(read_ascii(payload)?)),
            Decoder::Path => Ok(Value::Path(decode_path(payload)?)),
            Decoder::Grid => Ok(Value::Grid(decode_grid(payload)?)),
        }
    }
}

/// One registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodEntry {
    pub encoder: Encoder,
    pub decoder: Decoder,
}

/// Table of encoder/decoder pairs keyed by opcode
#[derive(Debug, Clone)]
pub struct MethodRegistry {
    methods: HashMap<Opcode, MethodEntry>,
}

impl MethodRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// The table every weight map server understands
    ///
    /// `DEBUG_PRINT` is deliberately absent.
    pub fn standard() -> Self {
        use Decoder as D;
        use Encoder as E;

        let mut registry = Self::new();
        registry.register(Opcode::SetWeight, E::IntCast, D::None);
        registry.register(Opcode::ResetMap, E::None, D::None);
        registry.register(Opcode::AddObstacle, E::IntCast, D::None);
        registry.register(Opcode::AddBorder, E::IntCast, D::None);
        registry.register(Opcode::CloseConnection, E::None, D::None);
        registry.register(Opcode::CloseServer, E::None, D::None);

        registry.register(Opcode::GetWidth, E::None, D::SingleInt);
        registry.register(Opcode::GetHeight, E::None, D::SingleInt);
        registry.register(Opcode::GetMinWeight, E::IntCast, D::SingleInt);
        registry.register(Opcode::GetMaxWeight, E::IntCast, D::SingleInt);
        registry.register(Opcode::GetMaxWeightInMap, E::IntCast, D::SingleInt);
        registry.register(Opcode::GetWeight, E::IntCast, D::SingleInt);

        registry.register(Opcode::GetWeights, E::None, D::Grid);
        registry.register(Opcode::GetPath, E::IntCast, D::Path);
        registry.register(Opcode::GetString, E::None, D::String);

        registry.register(Opcode::SetPos, E::IntCast, D::None);
        registry.register(Opcode::GetPos, E::None, D::DoubleInt);

        registry.register(Opcode::PathToLine, E::IntCast, D::Path);
        registry.register(Opcode::PathTo, E::IntCast, D::Path);
        registry.register(Opcode::SetRollPitchYaw, E::Float64, D::None);
        registry.register(Opcode::GetRollPitchYaw, E::None, D::TripleFloat64);
        registry
    }

    pub fn register(&mut self, opcode: Opcode, encoder: Encoder, decoder: Decoder) {
        tracing::trace!("Registered {} ({:?} / {:?})", opcode, encoder, decoder);
        self.methods.insert(opcode, MethodEntry { encoder, decoder });
    }

    /// Look up an opcode, failing with `UnknownOperation` when it is missing
    pub fn lookup(&self, opcode: Opcode) -> Result<MethodEntry> {
        self.methods.get(&opcode).copied().ok_or_else(|| {
            WeightMapError::UnknownOperation(format!("no handler registered for {}", opcode))
        })
    }

    pub fn has_method(&self, opcode: Opcode) -> bool {
        self.methods.contains_key(&opcode)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn encode(&self, opcode: Opcode, args: &[Arg]) -> Result<BytesMut> {
        self.lookup(opcode)?.encoder.encode(args)
    }

    pub fn decode(&self, opcode: Opcode, payload: &[u8]) -> Result<Value> {
        self.lookup(opcode)?.decoder.decode(payload)
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::compress;
    use weightmap_core::Point;

    #[test]
    fn test_standard_table() {
        let registry = MethodRegistry::standard();
        assert_eq!(registry.method_count(), 21);
        assert!(!registry.has_method(Opcode::DebugPrint));
        assert_eq!(
            registry.lookup(Opcode::SetRollPitchYaw).unwrap(),
            MethodEntry { encoder: Encoder::Float64, decoder: Decoder::None }
        );
        assert_eq!(registry.lookup(Opcode::GetWeights).unwrap().decoder, Decoder::Grid);
    }

    #[test]
    fn test_unknown_operation() {
        let registry = MethodRegistry::standard();
        let err = registry.encode(Opcode::DebugPrint, &[]).unwrap_err();
        assert!(matches!(err, WeightMapError::UnknownOperation(_)));
        assert!(err.to_string().contains("DEBUG_PRINT"));
    }

    #[test]
    fn test_int_round_trip() {
        let registry = MethodRegistry::standard();
        let payload = registry
            .encode(Opcode::SetPos, &[Arg::Int(-12), Arg::Int(34)])
            .unwrap();
        // GET_POS decodes the same layout SET_POS encodes
        let value = registry.decode(Opcode::GetPos, &payload).unwrap();
        assert_eq!(value, Value::IntPair(-12, 34));
    }

    #[test]
    fn test_float_round_trip_exact_bits() {
        let registry = MethodRegistry::standard();
        let (roll, pitch, yaw) = (0.1 + 0.2, -std::f64::consts::PI, f64::MIN_POSITIVE);
        let payload = registry
            .encode(Opcode::SetRollPitchYaw, &[roll.into(), pitch.into(), yaw.into()])
            .unwrap();
        match registry.decode(Opcode::GetRollPitchYaw, &payload).unwrap() {
            Value::Triple(a, b, c) => {
                assert_eq!(a.to_bits(), roll.to_bits());
                assert_eq!(b.to_bits(), pitch.to_bits());
                assert_eq!(c.to_bits(), yaw.to_bits());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_single_int_is_unsigned() {
        let value = Decoder::SingleInt.decode(&(-1i32).to_le_bytes()).unwrap();
        assert_eq!(value, Value::UInt(u32::MAX));
    }

    #[test]
    fn test_none_encoder_ignores_args() {
        assert!(Encoder::None.encode(&[Arg::Int(5)]).unwrap().is_empty());
    }

    #[test]
    fn test_triple_float_needs_24_bytes() {
        let result = Decoder::TripleFloat64.decode(&[0u8; 23]);
        assert!(matches!(result, Err(WeightMapError::Decode(_))));
    }

    #[test]
    fn test_string_decoder() {
        let value = Decoder::String.decode(b"1 1 1\n1 9 1\n\0\0\0\0").unwrap();
        assert_eq!(value, Value::Text("1 1 1\n1 9 1\n".to_string()));
    }

    #[test]
    fn test_path_and_grid_decoders() {
        let mut payload = 1i32.to_le_bytes().to_vec();
        payload.extend_from_slice(&[4, 0, 9, 0]);
        assert_eq!(
            Decoder::Path.decode(&payload).unwrap(),
            Value::Path(vec![Point::new(4, 9)])
        );

        let raw = [1u8, 0, 1, 0, 42, 0];
        match Decoder::Grid.decode(&compress(&raw).unwrap()).unwrap() {
            Value::Grid(grid) => assert_eq!(grid[(0, 0)], 42),
            other => panic!("unexpected {:?}", other),
        }
    }
}
