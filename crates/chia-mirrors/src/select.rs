use chia::protocol::CoinRecord;

use crate::{Error, Result};

/// Coin selection strategies. Only smallest-first is implemented today, but
/// the strategy is an explicit parameter so callers never depend on an
/// implicit default changing under them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CoinSelectionMode {
    /// Sort the pool ascending by amount (stable, so ties keep their pool
    /// order) and take the shortest prefix whose sum covers the target.
    #[default]
    SmallestFirst,
}

/// Picks unspent coins from `pool` whose total covers `required`.
///
/// Insufficiency is decided against the full-pool sum, so a pool that can
/// cover `required` at all never produces a false negative. The greedy
/// prefix is not guaranteed to be minimal in coin count or locked-up value.
/// The pool is not mutated; reserving the returned coins against concurrent
/// spends is the caller's responsibility.
pub fn select_coins(
    required: u64,
    pool: &[CoinRecord],
    mode: CoinSelectionMode,
) -> Result<Vec<CoinRecord>> {
    let available: u128 = pool.iter().map(|record| u128::from(record.coin.amount)).sum();
    if available < u128::from(required) {
        return Err(Error::InsufficientBalance {
            required,
            available: u64::try_from(available).unwrap_or(u64::MAX),
        });
    }

    let CoinSelectionMode::SmallestFirst = mode;

    let mut sorted: Vec<CoinRecord> = pool.to_vec();
    sorted.sort_by_key(|record| record.coin.amount);

    let mut selected = Vec::new();
    let mut total: u128 = 0;
    for record in sorted {
        if total >= u128::from(required) {
            break;
        }
        total += u128::from(record.coin.amount);
        selected.push(record);
    }
    Ok(selected)
}
