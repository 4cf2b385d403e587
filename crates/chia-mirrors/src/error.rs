use chia::bls::PublicKey;
use chia::protocol::Bytes32;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("insufficient balance: need {required} mojos, have {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("malformed program: {0}")]
    MalformedProgram(String),

    #[error("program execution failed: {0}")]
    ProgramExecution(String),

    #[error("coin not found: {0}")]
    CoinNotFound(Bytes32),

    #[error("puzzle and solution unavailable for coin {0}")]
    HistoryUnavailable(Bytes32),

    #[error("no puzzle known for puzzle hash {0}")]
    UnknownPuzzleHash(Bytes32),

    #[error("no secret key available for public key {0:?}")]
    SigningKeyUnavailable(PublicKey),

    #[error("mirror memo is not valid UTF-8")]
    InvalidMemoEncoding,

    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}

pub type Result<T> = std::result::Result<T, Error>;
