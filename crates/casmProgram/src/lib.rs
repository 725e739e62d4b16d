//! Codec for compiled Cairo program artifacts: bytecode, entry points and hints

pub mod constants;
mod builtin;
mod decode;
mod entry_point;
mod errors;
mod hint;
mod program;

pub use builtin::*;
pub use entry_point::*;
pub use errors::*;
pub use hint::*;
pub use program::*;
pub use stark_felt::{Felt, FeltError};
