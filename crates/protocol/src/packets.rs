//! # Weight Map Call Headers
//!
//! Every request frame starts with an [`Opcode`] naming the remote operation,
//! and every response frame starts with a [`ResponseStatus`].
//!
//! ## Wire Values
//!
//! Both enums are 32-bit little-endian signed integers on the wire. The values
//! must match the server's `CALL_HEADER` / `RESPONSE_HEADER` tables exactly and
//! are never reused for a different meaning.

use std::fmt;

/// Remote operation identifier
///
/// # Argument Layouts
///
/// Arguments follow the opcode in the request frame. Integer arguments are
/// `i32` little-endian, orientation arguments are `f64` little-endian:
///
/// ```text
/// ADD_BORDER          {width}{weight}{placement}
/// ADD_OBSTACLE        {x}{y}{radius}{weight}{gradient}
/// GET_PATH            {x1}{y1}{xf}{yf}
/// SET_WEIGHT          {x}{y}{weight}
/// GET_WEIGHT          {x}{y}
/// SET_POS             {x}{y}
/// PATH_TO             {xf}{yf}
/// PATH_TO_LINE        {x1}{y1}{xf}
/// SET_ROLL_PITCH_YAW  {roll:f64}{pitch:f64}{yaw:f64}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Opcode {
    //=== Map Mutation ===//
    /// Add a border along one or more grid edges
    AddBorder = 1,

    /// Add a circular obstacle, optionally with a linear gradient
    AddObstacle = 2,

    //=== Path Queries ===//
    /// Least costly path between two points
    GetPath = 3,

    //=== Map Accessors ===//
    GetWidth = 4,
    GetHeight = 5,
    GetMaxWeight = 6,
    GetMinWeight = 7,
    GetMaxWeightInMap = 8,
    SetWeight = 9,
    GetWeight = 10,

    /// Reset every cell to the minimum weight
    ResetMap = 11,

    /// Whole grid, zlib compressed
    GetWeights = 12,

    /// Printable rendering of the map
    GetString = 13,

    //=== Robot State ===//
    SetPos = 14,
    GetPos = 15,

    /// Ask the server to print the map on its own console
    DebugPrint = 16,

    /// Path from the stored position to a point
    PathTo = 17,

    /// Path from a point to the vertical line `x = xf`
    PathToLine = 18,

    GetRollPitchYaw = 19,
    SetRollPitchYaw = 20,

    //=== Lifecycle ===//
    CloseConnection = 999,

    /// Stop the server; it closes the connection without a reply
    CloseServer = 1000,
}

impl Opcode {
    /// Every opcode, in wire-value order
    pub const ALL: [Opcode; 22] = [
        Opcode::AddBorder,
        Opcode::AddObstacle,
        Opcode::GetPath,
        Opcode::GetWidth,
        Opcode::GetHeight,
        Opcode::GetMaxWeight,
        Opcode::GetMinWeight,
        Opcode::GetMaxWeightInMap,
        Opcode::SetWeight,
        Opcode::GetWeight,
        Opcode::ResetMap,
        Opcode::GetWeights,
        Opcode::GetString,
        Opcode::SetPos,
        Opcode::GetPos,
        Opcode::DebugPrint,
        Opcode::PathTo,
        Opcode::PathToLine,
        Opcode::GetRollPitchYaw,
        Opcode::SetRollPitchYaw,
        Opcode::CloseConnection,
        Opcode::CloseServer,
    ];

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Opcode::AddBorder),
            2 => Some(Opcode::AddObstacle),
            3 => Some(Opcode::GetPath),
            4 => Some(Opcode::GetWidth),
            5 => Some(Opcode::GetHeight),
            6 => Some(Opcode::GetMaxWeight),
            7 => Some(Opcode::GetMinWeight),
            8 => Some(Opcode::GetMaxWeightInMap),
            9 => Some(Opcode::SetWeight),
            10 => Some(Opcode::GetWeight),
            11 => Some(Opcode::ResetMap),
            12 => Some(Opcode::GetWeights),
            13 => Some(Opcode::GetString),
            14 => Some(Opcode::SetPos),
            15 => Some(Opcode::GetPos),
            16 => Some(Opcode::DebugPrint),
            17 => Some(Opcode::PathTo),
            18 => Some(Opcode::PathToLine),
            19 => Some(Opcode::GetRollPitchYaw),
            20 => Some(Opcode::SetRollPitchYaw),
            999 => Some(Opcode::CloseConnection),
            1000 => Some(Opcode::CloseServer),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Display name, matching the server's log output
    pub fn name(self) -> &'static str {
        match self {
            Opcode::AddBorder => "ADD_BORDER",
            Opcode::AddObstacle => "ADD_OBSTACLE",
            Opcode::GetPath => "GET_PATH",
            Opcode::GetWidth => "GET_WIDTH",
            Opcode::GetHeight => "GET_HEIGHT",
            Opcode::GetMaxWeight => "GET_MAX_WEIGHT",
            Opcode::GetMinWeight => "GET_MIN_WEIGHT",
            Opcode::GetMaxWeightInMap => "GET_MAX_WEIGHT_IN_MAP",
            Opcode::SetWeight => "SET_WEIGHT",
            Opcode::GetWeight => "GET_WEIGHT",
            Opcode::ResetMap => "RESET_MAP",
            Opcode::GetWeights => "GET_WEIGHTS",
            Opcode::GetString => "GET_STRING",
            Opcode::SetPos => "SET_POS",
            Opcode::GetPos => "GET_POS",
            Opcode::DebugPrint => "DEBUG_PRINT",
            Opcode::PathTo => "PATH_TO",
            Opcode::PathToLine => "PATH_TO_LINE",
            Opcode::GetRollPitchYaw => "GET_ROLL_PITCH_YAW",
            Opcode::SetRollPitchYaw => "SET_ROLL_PITCH_YAW",
            Opcode::CloseConnection => "CLOSE_CONNECTION",
            Opcode::CloseServer => "CLOSE_SERVER",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status carried in the header of a response frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResponseStatus {
    Success = 0,
    Failure = 1,
    /// More frames follow; the client must acknowledge this one
    Continue = 3,
    /// Sent by the client only
    Acknowledge = 4,
    SuccessCompressed = 5,
}

impl ResponseStatus {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(ResponseStatus::Success),
            1 => Some(ResponseStatus::Failure),
            3 => Some(ResponseStatus::Continue),
            4 => Some(ResponseStatus::Acknowledge),
            5 => Some(ResponseStatus::SuccessCompressed),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// True for every status that ends a response, i.e. all but `Continue`
    pub fn is_terminal(self) -> bool {
        self != ResponseStatus::Continue
    }

    pub fn is_success(self) -> bool {
        matches!(self, ResponseStatus::Success | ResponseStatus::SuccessCompressed)
    }
}
