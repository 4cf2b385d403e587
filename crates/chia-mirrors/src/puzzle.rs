use chia::protocol::{Bytes32, Program};
use chia_puzzles::{P2_PARENT, P2_PARENT_HASH};
use clvm_traits::{FromClvm, ToClvm};
use clvm_utils::{CurriedProgram, ToTreeHash, TreeHash};
use clvmr::serde::node_from_bytes;
use clvmr::{Allocator, NodePtr};
use num_bigint::BigUint;

use crate::{Error, Result};

/// Curry arguments of the `p2_parent` puzzle. Mirror coins all share the
/// same curried instance, so the resulting puzzle hash is a protocol-wide
/// constant for a given morpher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(curry)]
pub struct MirrorArgs {
    pub morpher: u64,
}

impl MirrorArgs {
    pub fn new(morpher: u64) -> Self {
        Self { morpher }
    }

    pub fn curry_tree_hash(morpher: u64) -> TreeHash {
        CurriedProgram {
            program: TreeHash::new(P2_PARENT_HASH),
            args: MirrorArgs::new(morpher),
        }
        .tree_hash()
    }
}

/// Allocates the full curried mirror puzzle.
pub fn curried_mirror_puzzle(a: &mut Allocator, morpher: u64) -> Result<NodePtr> {
    let mod_ptr =
        node_from_bytes(a, &P2_PARENT).map_err(|error| Error::MalformedProgram(error.to_string()))?;
    CurriedProgram {
        program: mod_ptr,
        args: MirrorArgs::new(morpher),
    }
    .to_clvm(a)
    .map_err(|error| Error::MalformedProgram(error.to_string()))
}

/// The canonical serialization of the curried mirror puzzle, suitable as a
/// `puzzle_reveal`.
pub fn mirror_puzzle_reveal(a: &mut Allocator, morpher: u64) -> Result<Program> {
    let ptr = curried_mirror_puzzle(a, morpher)?;
    Program::from_clvm(a, ptr).map_err(|error| Error::MalformedProgram(error.to_string()))
}

/// Derives the on-chain index key under which mirror coins are hinted.
///
/// The launcher id is read as a big-endian unsigned integer and incremented
/// by two (launcher id + 1 is taken by server coins). The result is encoded
/// big-endian again, left-padded with zeros to 32 bytes, and truncated to
/// its leading 32 bytes if the increment carried into a 33rd byte.
pub fn mirror_hint(launcher_id: Bytes32) -> Bytes32 {
    let value = BigUint::from_bytes_be(launcher_id.as_ref()) + 2u8;
    let bytes = value.to_bytes_be();

    let mut hint = [0; 32];
    if bytes.len() >= 32 {
        hint.copy_from_slice(&bytes[..32]);
    } else {
        hint[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    Bytes32::new(hint)
}

/// Solution shape of the `p2_parent` puzzle. The coin is unlocked by
/// revealing its parent and running the parent's inner puzzle (with a
/// morpher of 1, the parent's full puzzle) against `parent_solution`; the
/// conditions that run produces authorize the spend.
#[derive(Debug, Clone, PartialEq, Eq, ToClvm, FromClvm)]
#[clvm(list)]
pub struct P2ParentSolution<P, S> {
    pub parent_parent_coin_info: Bytes32,
    pub parent_inner_puzzle: P,
    pub parent_amount: u64,
    pub parent_solution: S,
}
