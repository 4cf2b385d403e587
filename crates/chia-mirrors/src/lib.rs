//! Spend construction and decoding for Chia data layer mirror coins.
//!
//! A mirror coin is a plain coin locked by the `p2_parent` puzzle curried
//! with a fixed morpher, whose creation memos carry a discovery hint and a
//! list of store URLs. This crate covers the pure core of working with
//! them: deriving the curried puzzle and hint, selecting coins, assembling
//! create/delete spend bundles, signing them, and recovering the URL
//! payload from a historical spend. Node and wallet access are collaborator
//! traits implemented elsewhere.

mod conditions;
mod constants;
mod error;
mod puzzle;
mod select;
mod sign;
mod spends;

#[cfg(test)]
mod test_util;

pub use conditions::*;
pub use constants::*;
pub use error::*;
pub use puzzle::*;
pub use select::*;
pub use sign::*;
pub use spends::*;
