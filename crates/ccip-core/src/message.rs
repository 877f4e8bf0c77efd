//! Assembly of send and fee-query requests from a user's intent.
//!
//! The assembler validates the intent against the source and destination
//! chain families, converts every address to its canonical form, resolves
//! SVM accounts, and serializes the execution hints. It performs no I/O;
//! the resulting requests are handed to whatever submits transactions or
//! quotes fees.

use alloy_primitives::U256;
use chain_sol::{DerivedAccount, PdaCache};
use log::debug;
use serde::{Serialize, Serializer};

use crate::accounts::{resolve_accounts, AccountRequest};
use crate::canonical::{CanonicalAddress, NativeAddress};
use crate::chains::ChainFamily;
use crate::config::ProtocolConfig;
use crate::error::CcipError;
use crate::extra_args::{decode_extra_args, encode_extra_args, ExecutionHints, ExtraArgsTag};

/// What the user wants to send, in the textual forms they typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserIntent {
    pub source_chain_selector: u64,
    pub destination_chain_selector: u64,
    /// Destination-native address (hex for EVM, Base58 for SVM).
    pub receiver: String,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    pub token_amounts: Vec<TokenAmountIntent>,
    /// Source-native fee token; `None` pays in the native currency.
    pub fee_token: Option<String>,
    pub extra_args: HintsIntent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenAmountIntent {
    /// Source-native token address.
    pub token: String,
    pub amount: U256,
}

/// Requested destination execution hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintsIntent {
    pub tag: ExtraArgsTag,
    pub execution_budget: u64,
    pub allow_out_of_order_execution: bool,
    /// Destination-native account that receives transferred tokens.
    pub token_receiver: Option<String>,
    pub accounts: Vec<AccountRequest>,
}

impl HintsIntent {
    pub fn evm(gas_limit: u64, allow_out_of_order_execution: bool) -> Self {
        Self {
            tag: ExtraArgsTag::GenericV2,
            execution_budget: gas_limit,
            allow_out_of_order_execution,
            token_receiver: None,
            accounts: Vec::new(),
        }
    }

    pub fn svm(compute_units: u32, allow_out_of_order_execution: bool) -> Self {
        Self {
            tag: ExtraArgsTag::SvmV1,
            execution_budget: u64::from(compute_units),
            allow_out_of_order_execution,
            token_receiver: None,
            accounts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenAmount {
    pub token: NativeAddress,
    pub amount: U256,
}

/// Shape of a message, as the receiver sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Tokens only. Also what the receiver records for an empty message.
    TokenTransfer,
    /// Data only.
    ArbitraryMessaging,
    /// Data and tokens together.
    ProgrammaticTokenTransfer,
}

impl MessageKind {
    pub fn classify(data: &[u8], token_count: usize) -> Self {
        match (data.is_empty(), token_count) {
            (false, 0) => MessageKind::ArbitraryMessaging,
            (false, _) => MessageKind::ProgrammaticTokenTransfer,
            (true, _) => MessageKind::TokenTransfer,
        }
    }
}

/// A fully validated message, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRequest {
    pub destination_chain_selector: u64,
    pub receiver: CanonicalAddress,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    pub token_amounts: Vec<TokenAmount>,
    pub fee_token: NativeAddress,
    #[serde(serialize_with = "serialize_hex")]
    pub extra_args: Vec<u8>,
    pub kind: MessageKind,
    /// Derivations behind the account list, for diagnostics.
    pub derived_accounts: Vec<DerivedAccount>,
}

impl SendRequest {
    /// The fee quote request for this message. `extra_args` is byte-identical.
    pub fn fee_query(&self) -> FeeQueryRequest {
        FeeQueryRequest {
            destination_chain_selector: self.destination_chain_selector,
            receiver: self.receiver,
            data: self.data.clone(),
            token_amounts: self.token_amounts.clone(),
            fee_token: self.fee_token,
            extra_args: self.extra_args.clone(),
            kind: self.kind,
        }
    }

    pub fn decode_hints(&self) -> Result<(ExtraArgsTag, ExecutionHints), CcipError> {
        decode_extra_args(&self.extra_args)
    }
}

/// The same message as [`SendRequest`], without execution-only context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeQueryRequest {
    pub destination_chain_selector: u64,
    pub receiver: CanonicalAddress,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    pub token_amounts: Vec<TokenAmount>,
    pub fee_token: NativeAddress,
    #[serde(serialize_with = "serialize_hex")]
    pub extra_args: Vec<u8>,
    pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledMessage {
    pub send: SendRequest,
    pub fee_query: FeeQueryRequest,
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{}", hex::encode(bytes)))
}

/// Turns [`UserIntent`]s into [`AssembledMessage`]s.
pub struct MessageAssembler<'a> {
    config: &'a ProtocolConfig,
}

impl<'a> MessageAssembler<'a> {
    pub fn new(config: &'a ProtocolConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, intent: &UserIntent) -> Result<AssembledMessage, CcipError> {
        self.build_with_cache(intent, &mut PdaCache::new())
    }

    /// Like [`build`](Self::build), reusing derivations across calls.
    pub fn build_with_cache(
        &self,
        intent: &UserIntent,
        cache: &mut PdaCache,
    ) -> Result<AssembledMessage, CcipError> {
        let source_family = self.config.chain_family(intent.source_chain_selector)?;
        let destination_family = self.config.chain_family(intent.destination_chain_selector)?;

        let receiver = parse_receiver(&intent.receiver, destination_family)?;
        let token_amounts = parse_token_amounts(&intent.token_amounts, source_family)?;

        let fee_token = match &intent.fee_token {
            Some(token) => parse_field("fee_token", token, source_family)?,
            None => {
                debug!("no fee token given, paying in native {source_family} currency");
                source_family.native_fee_token()
            }
        };

        let hints_intent = &intent.extra_args;
        let tag_family = hints_intent.tag.family();
        if tag_family != destination_family {
            return Err(CcipError::ExtraArgsFamilyMismatch {
                tag: hints_intent.tag.to_string(),
                tag_family: tag_family.to_string(),
                destination_family: destination_family.to_string(),
            });
        }

        if destination_family == ChainFamily::Svm
            && !token_amounts.is_empty()
            && hints_intent.token_receiver.is_none()
        {
            return Err(CcipError::MissingTokenReceiver);
        }

        if let Some(limits) = self.config.receiver_limits {
            check_limit("data", intent.data.len(), limits.max_data_len)?;
            check_limit("token_amounts", token_amounts.len(), limits.max_token_amounts)?;
        }

        let (hints, derived_accounts) = build_hints(hints_intent, destination_family, cache)?;
        let extra_args = encode_extra_args(hints_intent.tag, &hints)?;

        let kind = MessageKind::classify(&intent.data, token_amounts.len());
        let send = SendRequest {
            destination_chain_selector: intent.destination_chain_selector,
            receiver,
            data: intent.data.clone(),
            token_amounts,
            fee_token,
            extra_args,
            kind,
            derived_accounts,
        };

        debug!(
            "assembled {:?} message to {} ({}): {} data bytes, {} tokens, {} accounts, {}",
            send.kind,
            self.config
                .chain_name(send.destination_chain_selector)
                .unwrap_or("unnamed chain"),
            send.destination_chain_selector,
            send.data.len(),
            send.token_amounts.len(),
            hints.accounts.len(),
            hints_intent.tag,
        );

        Ok(AssembledMessage {
            fee_query: send.fee_query(),
            send,
        })
    }
}

fn parse_receiver(input: &str, family: ChainFamily) -> Result<CanonicalAddress, CcipError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CcipError::InvalidReceiver("receiver must not be empty".into()));
    }
    NativeAddress::parse(input, family)
        .map(|native| native.to_canonical())
        .map_err(|e| CcipError::InvalidReceiver(format!("not a valid {family} address: {e}")))
}

fn parse_field(field: &str, input: &str, family: ChainFamily) -> Result<NativeAddress, CcipError> {
    NativeAddress::parse(input.trim(), family).map_err(|e| CcipError::InvalidAddress {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

fn parse_token_amounts(
    intents: &[TokenAmountIntent],
    source_family: ChainFamily,
) -> Result<Vec<TokenAmount>, CcipError> {
    intents
        .iter()
        .map(|intent| {
            let invalid = |reason: &str| CcipError::InvalidTokenAmount {
                token: intent.token.clone(),
                reason: reason.to_string(),
            };
            if intent.amount.is_zero() {
                return Err(invalid("amount must be > 0"));
            }
            // SPL token amounts are u64.
            if source_family == ChainFamily::Svm && intent.amount > U256::from(u64::MAX) {
                return Err(invalid("amount exceeds the u64 range of SVM tokens"));
            }
            Ok(TokenAmount {
                token: parse_field("token", &intent.token, source_family)?,
                amount: intent.amount,
            })
        })
        .collect()
}

fn check_limit(field: &str, got: usize, max: usize) -> Result<(), CcipError> {
    if got > max {
        return Err(CcipError::LimitExceeded {
            field: field.to_string(),
            got,
            max,
        });
    }
    Ok(())
}

fn build_hints(
    intent: &HintsIntent,
    destination_family: ChainFamily,
    cache: &mut PdaCache,
) -> Result<(ExecutionHints, Vec<DerivedAccount>), CcipError> {
    let token_receiver = intent
        .token_receiver
        .as_deref()
        .map(|r| parse_field("token_receiver", r, destination_family).map(|n| n.to_canonical()))
        .transpose()?;

    match destination_family {
        ChainFamily::Evm => {
            if !intent.accounts.is_empty() {
                return Err(CcipError::UnsupportedHint {
                    tag: intent.tag.to_string(),
                    reason: "account lists are only carried by SVM extra args".into(),
                });
            }
            let mut hints =
                ExecutionHints::evm(intent.execution_budget, intent.allow_out_of_order_execution);
            hints.token_receiver = token_receiver;
            Ok((hints, Vec::new()))
        }
        ChainFamily::Svm => {
            let compute_units = u32::try_from(intent.execution_budget).map_err(|_| {
                CcipError::ExecutionBudgetOutOfRange {
                    budget: u128::from(intent.execution_budget),
                    max: u64::from(u32::MAX),
                }
            })?;
            let resolved = resolve_accounts(&intent.accounts, cache)?;
            let hints = ExecutionHints::svm(
                compute_units,
                intent.allow_out_of_order_execution,
                token_receiver,
                &resolved.accounts,
            )?;
            Ok((hints, resolved.derived))
        }
    }
}
