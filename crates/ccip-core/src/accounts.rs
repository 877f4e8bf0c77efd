//! Resolution of SVM account requests into the ordered account list carried
//! by `SVMExtraArgsV1`.

use chain_sol::spl_token::{ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID};
use chain_sol::{DerivedAccount, PdaCache, Pubkey};
use serde::Serialize;

use crate::canonical::CanonicalAddress;
use crate::error::CcipError;

/// One slot of a destination account list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountRequest {
    /// A known account.
    Explicit { address: Pubkey, writable: bool },
    /// A program-derived address, resolved from `seeds` under `program_id`.
    Derived {
        program_id: Pubkey,
        seeds: Vec<Vec<u8>>,
        writable: bool,
    },
    /// The associated token account of `wallet` for `mint`.
    AssociatedToken {
        wallet: Pubkey,
        mint: Pubkey,
        writable: bool,
    },
}

impl AccountRequest {
    pub fn explicit(address: Pubkey, writable: bool) -> Self {
        AccountRequest::Explicit { address, writable }
    }

    pub fn derived(program_id: Pubkey, seeds: &[&[u8]], writable: bool) -> Self {
        AccountRequest::Derived {
            program_id,
            seeds: seeds.iter().map(|s| s.to_vec()).collect(),
            writable,
        }
    }

    pub fn associated_token(wallet: Pubkey, mint: Pubkey, writable: bool) -> Self {
        AccountRequest::AssociatedToken {
            wallet,
            mint,
            writable,
        }
    }

    pub fn writable(&self) -> bool {
        match self {
            AccountRequest::Explicit { writable, .. }
            | AccountRequest::Derived { writable, .. }
            | AccountRequest::AssociatedToken { writable, .. } => *writable,
        }
    }
}

/// Account list ready for [`crate::extra_args::ExecutionHints::svm`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAccounts {
    pub accounts: Vec<(CanonicalAddress, bool)>,
    /// Derivations performed along the way, in request order.
    pub derived: Vec<DerivedAccount>,
}

/// Resolves every request in order. The first failed derivation aborts.
pub fn resolve_accounts(
    requests: &[AccountRequest],
    cache: &mut PdaCache,
) -> Result<ResolvedAccounts, CcipError> {
    let mut resolved = ResolvedAccounts::default();

    for request in requests {
        let address = match request {
            AccountRequest::Explicit { address, .. } => *address,
            AccountRequest::Derived {
                program_id, seeds, ..
            } => {
                let seeds: Vec<&[u8]> = seeds.iter().map(Vec::as_slice).collect();
                let derived = cache.get_or_derive(&seeds, program_id)?;
                let address = derived.address;
                resolved.derived.push(derived);
                address
            }
            AccountRequest::AssociatedToken { wallet, mint, .. } => {
                let derived = cache.get_or_derive(
                    &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
                    &ASSOCIATED_TOKEN_PROGRAM_ID,
                )?;
                let address = derived.address;
                resolved.derived.push(derived);
                address
            }
        };
        resolved
            .accounts
            .push((CanonicalAddress::from(address), request.writable()));
    }

    Ok(resolved)
}
