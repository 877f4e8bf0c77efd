//! Account layouts of the reference SVM receiver program.
//!
//! A receiver on an SVM chain reads its accounts from the message's extra
//! args, so a sender must list them in exactly the order the program
//! expects. The seed strings are configuration; [`SeedCatalog::default`]
//! holds the ones the reference receiver is deployed with.

use chain_sol::spl_token::TOKEN_PROGRAM_ID;
use chain_sol::{find_program_address, DerivedAccount, Pubkey};
use serde::{Deserialize, Serialize};

use crate::accounts::AccountRequest;
use crate::error::CcipError;

/// PDA seed prefixes used by a receiver program and the router/offramp
/// around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedCatalog {
    pub state: String,
    pub messages_storage: String,
    pub token_vault: String,
    pub external_execution_config: String,
    pub allowed_offramp: String,
    pub token_admin: String,
}

impl Default for SeedCatalog {
    fn default() -> Self {
        Self {
            state: "state".into(),
            messages_storage: "messages_storage".into(),
            token_vault: "token_vault".into(),
            external_execution_config: "external_execution_config".into(),
            allowed_offramp: "allowed_offramp".into(),
            token_admin: "token_admin".into(),
        }
    }
}

impl SeedCatalog {
    /// Accounts needed to deliver a data message:
    /// `[state (ro), messages_storage (w)]`.
    pub fn message_accounts(&self, program_id: &Pubkey) -> Vec<AccountRequest> {
        vec![
            AccountRequest::derived(*program_id, &[self.state.as_bytes()], false),
            AccountRequest::derived(*program_id, &[self.messages_storage.as_bytes()], true),
        ]
    }

    /// Accounts needed for the receiver to forward `mint` to `recipient`:
    /// `[mint (ro), token_vault (w), token_admin (ro), recipient ATA (w),
    /// token_program (ro)]`. The receiver rejects the message unless slot 2
    /// is its `token_admin` PDA.
    pub fn token_forwarding_accounts(
        &self,
        program_id: &Pubkey,
        mint: &Pubkey,
        recipient: &Pubkey,
    ) -> Vec<AccountRequest> {
        vec![
            AccountRequest::explicit(*mint, false),
            AccountRequest::derived(
                *program_id,
                &[self.token_vault.as_bytes(), mint.as_ref()],
                true,
            ),
            AccountRequest::derived(*program_id, &[self.token_admin.as_bytes()], false),
            AccountRequest::associated_token(*recipient, *mint, true),
            AccountRequest::explicit(TOKEN_PROGRAM_ID, false),
        ]
    }

    pub fn state_address(&self, program_id: &Pubkey) -> Result<DerivedAccount, CcipError> {
        Ok(find_program_address(&[self.state.as_bytes()], program_id)?)
    }

    /// Authority the receiver signs with when moving tokens out of its vault.
    pub fn token_admin_address(&self, program_id: &Pubkey) -> Result<DerivedAccount, CcipError> {
        Ok(find_program_address(&[self.token_admin.as_bytes()], program_id)?)
    }

    /// Router-owned marker proving `offramp` may deliver messages from
    /// `source_chain_selector`.
    pub fn allowed_offramp_address(
        &self,
        router: &Pubkey,
        source_chain_selector: u64,
        offramp: &Pubkey,
    ) -> Result<DerivedAccount, CcipError> {
        let selector = source_chain_selector.to_le_bytes();
        Ok(find_program_address(
            &[self.allowed_offramp.as_bytes(), &selector, offramp.as_ref()],
            router,
        )?)
    }

    /// Offramp-owned signer that authenticates calls into `receiver_program`.
    pub fn external_execution_config_address(
        &self,
        offramp: &Pubkey,
        receiver_program: &Pubkey,
    ) -> Result<DerivedAccount, CcipError> {
        Ok(find_program_address(
            &[
                self.external_execution_config.as_bytes(),
                receiver_program.as_ref(),
            ],
            offramp,
        )?)
    }
}
