use chia::bls::{aggregate, sign, PublicKey, SecretKey};
use chia::protocol::{Bytes32, SpendBundle};
use clvmr::Allocator;

use crate::{decode_conditions, Condition, Error, Result};

/// Key lookup for signing. The wallet's keystore implements this; the core
/// never persists or derives keys itself.
pub trait KeyStore {
    fn secret_key_for_public_key(&self, public_key: &PublicKey) -> Option<SecretKey>;
}

/// Signs every AGG_SIG_ME obligation in the bundle and replaces its
/// aggregate signature.
///
/// Each coin spend is re-run to surface its AGG_SIG_ME conditions; the
/// signed message is the condition's payload followed by the coin id and
/// the domain separator. BLS signing is deterministic, so signing the same
/// bundle with the same keys is idempotent. A missing key fails the whole
/// call; a partially signed bundle is never returned.
pub fn sign_spend_bundle(
    mut bundle: SpendBundle,
    keys: &impl KeyStore,
    agg_sig_me_extra_data: Bytes32,
) -> Result<SpendBundle> {
    let a = &mut Allocator::new();
    let checkpoint = a.checkpoint();

    let mut signatures = Vec::new();
    for coin_spend in &bundle.coin_spends {
        a.restore_checkpoint(&checkpoint);
        let conditions = decode_conditions(a, &coin_spend.puzzle_reveal, &coin_spend.solution)?;
        let coin_id = coin_spend.coin.coin_id();

        for condition in conditions {
            let Condition::AggSigMe(agg_sig) = condition else {
                continue;
            };
            let secret_key = keys
                .secret_key_for_public_key(&agg_sig.public_key)
                .ok_or(Error::SigningKeyUnavailable(agg_sig.public_key))?;

            let mut message = Vec::with_capacity(agg_sig.message.len() + 64);
            message.extend_from_slice(agg_sig.message.as_ref());
            message.extend_from_slice(coin_id.as_ref());
            message.extend_from_slice(agg_sig_me_extra_data.as_ref());
            signatures.push(sign(&secret_key, &message));
        }
    }

    bundle.aggregated_signature = aggregate(&signatures);
    Ok(bundle)
}
