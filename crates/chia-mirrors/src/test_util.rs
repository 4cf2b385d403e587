use std::collections::HashMap;

use chia::bls::{PublicKey, SecretKey};
use chia::protocol::{Bytes, Bytes32, Coin, CoinRecord, CoinSpend, Program};
use chia::puzzles::standard::StandardArgs;
use chia_puzzles::P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE;
use clvm_traits::{FromClvm, ToClvm};
use clvm_utils::CurriedProgram;
use clvmr::serde::node_from_bytes;
use clvmr::Allocator;

use crate::{
    build_create, ChainHistory, KeyStore, MirrorArgs, MirrorConstants, Result, WalletCoinSource,
};

/// Protocol parameters distinct from mainnet's, so nothing under test can
/// get away with an embedded constant.
pub fn consts() -> MirrorConstants {
    MirrorConstants {
        launcher_id: Bytes32::new([0x11; 32]),
        morpher: 1,
        agg_sig_me_extra_data: Bytes32::new([0x77; 32]),
    }
}

pub fn store_id(tag: u8) -> Bytes {
    Bytes::new(vec![tag; 32])
}

/// A single-key wallet holding standard coins with the given amounts.
pub struct TestWallet {
    secret_key: SecretKey,
    records: Vec<CoinRecord>,
    puzzles: HashMap<Bytes32, Program>,
}

impl TestWallet {
    pub fn new(seed: u8, amounts: &[u64]) -> Self {
        let secret_key = SecretKey::from_seed(&[seed; 32]);
        let public_key = secret_key.public_key();

        let a = &mut Allocator::new();
        let mod_ptr = node_from_bytes(a, &P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE).unwrap();
        let puzzle_ptr = CurriedProgram {
            program: mod_ptr,
            args: StandardArgs::new(public_key),
        }
        .to_clvm(a)
        .unwrap();
        let puzzle = Program::from_clvm(a, puzzle_ptr).unwrap();
        let puzzle_hash: Bytes32 = StandardArgs::curry_tree_hash(public_key).into();

        let records = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| {
                let parent = Bytes32::new([i as u8 + 1; 32]);
                CoinRecord::new(Coin::new(parent, puzzle_hash, amount), 10, 0, false, 0)
            })
            .collect();

        Self {
            secret_key,
            records,
            puzzles: HashMap::from([(puzzle_hash, puzzle)]),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret_key.public_key()
    }
}

impl WalletCoinSource for TestWallet {
    fn owned_coin_records(&self) -> Result<Vec<CoinRecord>> {
        Ok(self.records.clone())
    }

    fn puzzle_for_hash(&self, puzzle_hash: Bytes32) -> Option<Program> {
        self.puzzles.get(&puzzle_hash).cloned()
    }
}

impl KeyStore for TestWallet {
    fn secret_key_for_public_key(&self, public_key: &PublicKey) -> Option<SecretKey> {
        (self.secret_key.public_key() == *public_key).then(|| self.secret_key.clone())
    }
}

/// An in-memory stand-in for the node's historical lookups.
#[derive(Default)]
pub struct TestChain {
    pub records: HashMap<Bytes32, CoinRecord>,
    pub spends: HashMap<Bytes32, CoinSpend>,
    pub hinted: Vec<CoinRecord>,
}

impl TestChain {
    /// Confirms a freshly built mirror creation on the fake chain and
    /// returns it together with the resulting mirror coin.
    pub fn with_mirror(
        consts: &MirrorConstants,
        wallet: &TestWallet,
        amount: u64,
        urls: &[&str],
    ) -> (Self, Coin) {
        let store_ids: Vec<Bytes> = urls
            .iter()
            .map(|url| Bytes::new(url.as_bytes().to_vec()))
            .collect();
        let bundle = build_create(consts, &store_ids, amount, 0, wallet).unwrap();
        let parent_spend = bundle.coin_spends[0].clone();

        let mirror_puzzle_hash: Bytes32 = MirrorArgs::curry_tree_hash(consts.morpher).into();
        let mirror_coin = Coin::new(parent_spend.coin.coin_id(), mirror_puzzle_hash, amount);
        let mirror_record = CoinRecord::new(mirror_coin, 20, 0, false, 0);

        let chain = Self {
            records: HashMap::from([(mirror_coin.coin_id(), mirror_record)]),
            spends: HashMap::from([(parent_spend.coin.coin_id(), parent_spend)]),
            hinted: vec![mirror_record],
        };
        (chain, mirror_coin)
    }
}

impl ChainHistory for TestChain {
    fn coin_record_by_name(&self, coin_id: Bytes32) -> Result<Option<CoinRecord>> {
        Ok(self.records.get(&coin_id).copied())
    }

    fn puzzle_and_solution(&self, coin_id: Bytes32, _height: u32) -> Result<Option<CoinSpend>> {
        Ok(self.spends.get(&coin_id).cloned())
    }

    fn coin_records_by_hint(&self, _hint: Bytes32) -> Result<Vec<CoinRecord>> {
        Ok(self.hinted.clone())
    }
}
