//! Weight map client core - errors and geometric value types

mod error;
mod positions;
mod types;

pub use error::*;
pub use positions::*;
pub use types::*;
