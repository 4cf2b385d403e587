use chia::protocol::Bytes32;
use hex_literal::hex;

/// Protocol parameters for the mirror coin layer.
///
/// These are injected into every operation rather than read from embedded
/// literals so that tests (and other networks) can substitute their own
/// values. The curried puzzle hash and the discovery hint are both total
/// functions of these fields, so two processes handed the same constants
/// derive byte-identical results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorConstants {
    /// The fixed launcher identifier the discovery hint is derived from.
    pub launcher_id: Bytes32,
    /// The morpher curried into the `p2_parent` base puzzle.
    pub morpher: u64,
    /// Domain separator mixed into every AGG_SIG_ME message, i.e. the
    /// network's genesis challenge.
    pub agg_sig_me_extra_data: Bytes32,
}

impl MirrorConstants {
    pub const MAINNET: Self = Self {
        launcher_id: Bytes32::new(hex!(
            "d4afd611d20e85edfed3904f20d2ecffd7109e59ac3681936edce4cc7847da8f"
        )),
        morpher: 1,
        agg_sig_me_extra_data: Bytes32::new(hex!(
            "ccd5bb71183532bff220ba46c268991a3ff07eb358e8255a65c30a2dce0e5fbb"
        )),
    };
}
