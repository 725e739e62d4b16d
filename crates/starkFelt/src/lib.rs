//! Stark field elements - residues modulo `P = 2^251 + 17 * 2^192 + 1`

mod error;
mod felt;

pub use error::*;
pub use felt::*;
