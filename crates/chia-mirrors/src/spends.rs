use chia::bls::Signature;
use chia::protocol::{Bytes, Bytes32, Coin, CoinRecord, CoinSpend, Program, SpendBundle};
use chia::puzzles::standard::StandardSolution;
use clvm_traits::{FromClvm, ToClvm};
use clvmr::Allocator;

use crate::{
    decode_conditions, extract_mirror_urls, mirror_hint, mirror_puzzle_reveal, select_coins,
    CoinSelectionMode, Condition, CreateCoin, Error, MirrorArgs, MirrorConstants,
    P2ParentSolution, Result,
};

/// Read access to the wallet's unspent coins and the puzzles it can sign
/// for. Backed elsewhere by the wallet's sync state; the core only ever
/// reads it.
pub trait WalletCoinSource {
    fn owned_coin_records(&self) -> Result<Vec<CoinRecord>>;

    /// The full puzzle reveal whose tree hash is `puzzle_hash`, if the
    /// wallet controls it.
    fn puzzle_for_hash(&self, puzzle_hash: Bytes32) -> Option<Program>;
}

/// Historical chain lookups, mirroring the node RPC surface
/// (`get_coin_record_by_name`, `get_puzzle_and_solution`,
/// `get_coin_records_by_hint`). Transport, timeouts, and retries live with
/// the implementor.
pub trait ChainHistory {
    fn coin_record_by_name(&self, coin_id: Bytes32) -> Result<Option<CoinRecord>>;

    /// The spend of `coin_id`, as recorded at `height`.
    fn puzzle_and_solution(&self, coin_id: Bytes32, height: u32) -> Result<Option<CoinSpend>>;

    fn coin_records_by_hint(&self, hint: Bytes32) -> Result<Vec<CoinRecord>>;
}

/// One discovered mirror coin, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorInfo {
    pub amount: u64,
    pub coin_id: Bytes32,
    pub launcher_id: Bytes32,
    /// Whether the spend that created this mirror came from one of our own
    /// puzzles. Every mirror coin carries the shared curried puzzle hash,
    /// so ownership is a property of the creating (parent) spend.
    pub ours: bool,
    pub urls: Vec<String>,
}

fn standard_spend(
    a: &mut Allocator,
    coin: Coin,
    puzzle_reveal: Program,
    conditions: Vec<Condition>,
) -> Result<CoinSpend> {
    let solution = StandardSolution::from_conditions(conditions)
        .to_clvm(a)
        .map_err(|error| Error::MalformedProgram(error.to_string()))?;
    let solution =
        Program::from_clvm(a, solution).map_err(|error| Error::MalformedProgram(error.to_string()))?;
    Ok(CoinSpend::new(coin, puzzle_reveal, solution))
}

/// Spends `selected` standard coins, with the designated primary input
/// carrying `primary_conditions` and every other input contributing value
/// only.
fn spend_selected_coins(
    a: &mut Allocator,
    wallet: &impl WalletCoinSource,
    selected: &[CoinRecord],
    primary_conditions: Vec<Condition>,
) -> Result<Vec<CoinSpend>> {
    let Some((primary, contributors)) = selected.split_first() else {
        // selection is always driven by a non-zero target
        unreachable!("coin selection produced no primary input");
    };

    let reveal_for = |record: &CoinRecord| {
        wallet
            .puzzle_for_hash(record.coin.puzzle_hash)
            .ok_or(Error::UnknownPuzzleHash(record.coin.puzzle_hash))
    };

    let mut coin_spends = Vec::with_capacity(selected.len());
    coin_spends.push(standard_spend(
        a,
        primary.coin,
        reveal_for(primary)?,
        primary_conditions,
    )?);
    for record in contributors {
        coin_spends.push(standard_spend(a, record.coin, reveal_for(record)?, Vec::new())?);
    }
    Ok(coin_spends)
}

fn selected_total(selected: &[CoinRecord]) -> u128 {
    selected
        .iter()
        .map(|record| u128::from(record.coin.amount))
        .sum()
}

/// Builds an unsigned spend bundle creating a new mirror coin.
///
/// Coins covering `amount + fee` are chosen smallest-first from the wallet.
/// The primary input authorizes the mirror coin (memos: discovery hint
/// followed by `store_ids`) and returns the change to its own puzzle hash;
/// the remaining inputs contribute value only. The bundle carries the
/// identity aggregate signature until [`sign_spend_bundle`] replaces it.
///
/// [`sign_spend_bundle`]: crate::sign_spend_bundle
pub fn build_create(
    consts: &MirrorConstants,
    store_ids: &[Bytes],
    amount: u64,
    fee: u64,
    wallet: &impl WalletCoinSource,
) -> Result<SpendBundle> {
    let a = &mut Allocator::new();
    let pool = wallet.owned_coin_records()?;

    // floor of 1 mojo so a zero-value request still anchors a spend
    let required = amount.saturating_add(fee).max(1);
    let selected = select_coins(required, &pool, CoinSelectionMode::SmallestFirst)?;

    let total = selected_total(&selected);
    let debit = u128::from(amount) + u128::from(fee);
    assert!(total >= debit, "selected inputs do not cover the spend");
    let change = u64::try_from(total - debit).expect("change exceeds u64");

    let mirror_puzzle_hash: Bytes32 = MirrorArgs::curry_tree_hash(consts.morpher).into();
    let mut memos: Vec<Bytes> = Vec::with_capacity(store_ids.len() + 1);
    memos.push(mirror_hint(consts.launcher_id).into());
    memos.extend(store_ids.iter().cloned());

    let primary = selected[0].coin;
    let primary_conditions = vec![
        Condition::CreateCoin(CreateCoin::with_memos(mirror_puzzle_hash, amount, memos)),
        Condition::CreateCoin(CreateCoin::new(primary.puzzle_hash, change)),
    ];

    let coin_spends = spend_selected_coins(a, wallet, &selected, primary_conditions)?;
    Ok(SpendBundle::new(coin_spends, Signature::default()))
}

/// Builds an unsigned spend bundle deleting an existing mirror coin.
///
/// The target is spent with the curried mirror puzzle and a `p2_parent`
/// solution that reveals its parent and delegates to an empty condition
/// list, consuming the coin without recreating it. Fee coins are selected
/// separately (target `fee + 1` so a zero-fee delete still selects an
/// anchor input) with change returned on the primary fee input. Spend
/// order is fixed: fee inputs first, the deletion spend last.
pub fn build_delete(
    consts: &MirrorConstants,
    coin_id: Bytes32,
    fee: u64,
    wallet: &impl WalletCoinSource,
    chain: &impl ChainHistory,
) -> Result<SpendBundle> {
    let a = &mut Allocator::new();

    let record = chain
        .coin_record_by_name(coin_id)?
        .ok_or(Error::CoinNotFound(coin_id))?;
    let parent = chain
        .puzzle_and_solution(record.coin.parent_coin_info, record.confirmed_block_index)?
        .ok_or(Error::HistoryUnavailable(record.coin.parent_coin_info))?;

    let pool = wallet.owned_coin_records()?;
    let required = fee.saturating_add(1);
    let selected = select_coins(required, &pool, CoinSelectionMode::SmallestFirst)?;

    let total = selected_total(&selected);
    assert!(total >= u128::from(fee), "selected inputs do not cover the fee");
    let change = u64::try_from(total - u128::from(fee)).expect("change exceeds u64");

    let primary = selected[0].coin;
    let primary_conditions = vec![Condition::CreateCoin(CreateCoin::new(
        primary.puzzle_hash,
        change,
    ))];
    let mut coin_spends = spend_selected_coins(a, wallet, &selected, primary_conditions)?;

    let solution = P2ParentSolution {
        parent_parent_coin_info: parent.coin.parent_coin_info,
        parent_inner_puzzle: parent.puzzle_reveal.clone(),
        parent_amount: parent.coin.amount,
        parent_solution: StandardSolution::from_conditions(()),
    }
    .to_clvm(a)
    .map_err(|error| Error::MalformedProgram(error.to_string()))?;
    let solution =
        Program::from_clvm(a, solution).map_err(|error| Error::MalformedProgram(error.to_string()))?;

    coin_spends.push(CoinSpend::new(
        record.coin,
        mirror_puzzle_reveal(a, consts.morpher)?,
        solution,
    ));

    Ok(SpendBundle::new(coin_spends, Signature::default()))
}

/// Discovers mirror coins by hint and recovers their URL payloads.
///
/// Results follow the discovery lookup's order. Any failed historical
/// lookup aborts the whole call; a listing never silently drops records.
pub fn list_mirrors(
    consts: &MirrorConstants,
    wallet: &impl WalletCoinSource,
    chain: &impl ChainHistory,
) -> Result<Vec<MirrorInfo>> {
    let a = &mut Allocator::new();
    let checkpoint = a.checkpoint();

    let hint = mirror_hint(consts.launcher_id);
    let mirror_puzzle_hash: Bytes32 = MirrorArgs::curry_tree_hash(consts.morpher).into();

    let records = chain.coin_records_by_hint(hint)?;
    let mut mirrors = Vec::with_capacity(records.len());
    for record in records {
        a.restore_checkpoint(&checkpoint);
        let parent = chain
            .puzzle_and_solution(record.coin.parent_coin_info, record.confirmed_block_index)?
            .ok_or(Error::HistoryUnavailable(record.coin.parent_coin_info))?;

        let conditions = decode_conditions(a, &parent.puzzle_reveal, &parent.solution)?;
        let urls = extract_mirror_urls(&conditions, mirror_puzzle_hash)?;
        let ours = wallet.puzzle_for_hash(parent.coin.puzzle_hash).is_some();

        mirrors.push(MirrorInfo {
            amount: record.coin.amount,
            coin_id: record.coin.coin_id(),
            launcher_id: consts.launcher_id,
            ours,
            urls,
        });
    }
    Ok(mirrors)
}
