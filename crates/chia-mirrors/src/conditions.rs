use chia::bls::PublicKey;
use chia::protocol::{Bytes, Bytes32, Program};
use clvm_traits::{apply_constants, FromClvm, ToClvm, ToClvmError};
use clvmr::op_utils::first;
use clvmr::reduction::Reduction;
use clvmr::run_program;
use clvmr::serde::node_from_bytes;
use clvmr::{Allocator, ChiaDialect, ClvmFlags, NodePtr, SExp};

use crate::{Error, Result};

pub const AGG_SIG_ME: u64 = 50;
pub const CREATE_COIN: u64 = 51;
pub const RESERVE_FEE: u64 = 52;

/// The consensus cost ceiling for a single program run.
const MAX_RUN_COST: u64 = 11_000_000_000;

#[derive(ToClvm, FromClvm)]
#[apply_constants]
#[derive(Debug, Clone, PartialEq, Eq)]
#[clvm(list)]
pub struct CreateCoin {
    #[clvm(constant = 51)]
    pub opcode: u8,
    pub puzzle_hash: Bytes32,
    pub amount: u64,
    #[clvm(default)]
    pub memos: Vec<Bytes>,
}

impl CreateCoin {
    pub fn new(puzzle_hash: Bytes32, amount: u64) -> Self {
        Self::with_memos(puzzle_hash, amount, Vec::new())
    }

    pub fn with_memos(puzzle_hash: Bytes32, amount: u64, memos: Vec<Bytes>) -> Self {
        Self {
            puzzle_hash,
            amount,
            memos,
        }
    }
}

#[derive(ToClvm, FromClvm)]
#[apply_constants]
#[derive(Debug, Clone, PartialEq, Eq)]
#[clvm(list)]
pub struct AggSigMe {
    #[clvm(constant = 50)]
    pub opcode: u8,
    pub public_key: PublicKey,
    pub message: Bytes,
}

#[derive(ToClvm, FromClvm)]
#[apply_constants]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[clvm(list)]
pub struct ReserveFee {
    #[clvm(constant = 52)]
    pub opcode: u8,
    pub amount: u64,
}

/// A decoded condition. The set is closed so matches stay exhaustive;
/// opcodes this crate has no structured reading for are preserved as
/// [`Condition::Unknown`] rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    CreateCoin(CreateCoin),
    AggSigMe(AggSigMe),
    ReserveFee(ReserveFee),
    Unknown { opcode: u64, body: Program },
}

impl ToClvm<Allocator> for Condition {
    fn to_clvm(&self, a: &mut Allocator) -> std::result::Result<NodePtr, ToClvmError> {
        match self {
            Self::CreateCoin(condition) => condition.to_clvm(a),
            Self::AggSigMe(condition) => condition.to_clvm(a),
            Self::ReserveFee(condition) => condition.to_clvm(a),
            Self::Unknown { body, .. } => body.to_clvm(a),
        }
    }
}

fn unknown_condition(a: &Allocator, node: NodePtr, opcode: u64) -> Result<Condition> {
    let body =
        Program::from_clvm(a, node).map_err(|error| Error::InvalidCondition(error.to_string()))?;
    Ok(Condition::Unknown { opcode, body })
}

/// Classifies one entry of a condition list.
///
/// A condition whose opcode matches a known variant but whose body does not
/// fit the expected shape degrades to [`Condition::Unknown`]; conditions are
/// an open wire format and this decoder is a classifier, not a validator.
pub fn parse_condition(a: &Allocator, node: NodePtr) -> Result<Condition> {
    let op = first(a, node).map_err(|error| Error::InvalidCondition(error.to_string()))?;
    let SExp::Atom = a.sexp(op) else {
        return Err(Error::InvalidCondition(
            "condition opcode is not an atom".to_string(),
        ));
    };

    let atom = a.atom(op);
    let bytes = atom.as_ref();
    if bytes.len() > 8 {
        return Err(Error::InvalidCondition(
            "condition opcode out of range".to_string(),
        ));
    }
    let mut opcode = 0_u64;
    for &byte in bytes {
        opcode = opcode << 8 | u64::from(byte);
    }

    let parsed = match opcode {
        AGG_SIG_ME => AggSigMe::from_clvm(a, node).ok().map(Condition::AggSigMe),
        CREATE_COIN => CreateCoin::from_clvm(a, node).ok().map(Condition::CreateCoin),
        RESERVE_FEE => ReserveFee::from_clvm(a, node).ok().map(Condition::ReserveFee),
        _ => None,
    };
    match parsed {
        Some(condition) => Ok(condition),
        None => unknown_condition(a, node, opcode),
    }
}

/// Runs a recovered puzzle reveal against its recovered solution and
/// returns the emitted conditions in order.
pub fn decode_conditions(
    a: &mut Allocator,
    puzzle_reveal: &Program,
    solution: &Program,
) -> Result<Vec<Condition>> {
    let puzzle = node_from_bytes(a, puzzle_reveal.as_ref())
        .map_err(|error| Error::MalformedProgram(error.to_string()))?;
    let args = node_from_bytes(a, solution.as_ref())
        .map_err(|error| Error::MalformedProgram(error.to_string()))?;

    let dialect = ChiaDialect::new(ClvmFlags::empty());
    let Reduction(_cost, mut output) = run_program(a, &dialect, puzzle, args, MAX_RUN_COST)
        .map_err(|error| Error::ProgramExecution(error.to_string()))?;

    let mut conditions = Vec::new();
    while let Some((condition, rest)) = a.next(output) {
        output = rest;
        conditions.push(parse_condition(a, condition)?);
    }
    Ok(conditions)
}

/// Pulls the store URLs out of a decoded condition list.
///
/// The payload lives on the first CREATE_COIN aimed at the mirror puzzle
/// hash that carries memos: the leading memo is the discovery hint, every
/// later one a UTF-8 URL. No matching condition yields an empty list, which
/// is distinct from a decode failure.
pub fn extract_mirror_urls(
    conditions: &[Condition],
    mirror_puzzle_hash: Bytes32,
) -> Result<Vec<String>> {
    for condition in conditions {
        let Condition::CreateCoin(create_coin) = condition else {
            continue;
        };
        if create_coin.puzzle_hash != mirror_puzzle_hash || create_coin.memos.is_empty() {
            continue;
        }
        return create_coin.memos[1..]
            .iter()
            .map(|memo| {
                String::from_utf8(memo.to_vec()).map_err(|_| Error::InvalidMemoEncoding)
            })
            .collect();
    }
    Ok(Vec::new())
}
