// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction related APDUs, used to stream and sign an EOS transaction via the hardware wallet.
//!
//! See [eos_signer_core::engine] for interaction and state machines

use encdec::{Decode, Encode};
use ledger_proto::ApduStatic;

use crate::{helpers::arr, state::TxState, ApduError, Instruction, EOS_APDU_CLA};

mod sign_tx;
pub use sign_tx::*;

mod action;
pub use action::*;

/// Transaction information request APDU
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxInfoReq;

impl ApduStatic for TxInfoReq {
    const CLA: u8 = EOS_APDU_CLA;
    const INS: u8 = Instruction::TxGetInfo as u8;
}

/// Abort transaction operation (0 length APDU), discards any transaction in progress
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxAbort;

impl ApduStatic for TxAbort {
    const CLA: u8 = EOS_APDU_CLA;
    const INS: u8 = Instruction::TxAbort as u8;
}

/// Transaction information response APDU.
///
/// Received in response to [`SignTx`] and each non-final [`TxActionAck`], contains the current
/// transaction engine state and the number of actions the device still expects.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   TX_STATE    |                    RESERVED                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       ACTIONS_REMAINING                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxInfo {
    /// Current transaction engine state
    pub state: TxState,

    /// Reserved for future use (maintains 32-bit field alignment)
    #[encdec(with = "arr")]
    reserved: [u8; 3],

    /// Number of actions remaining before the transaction is signed
    pub actions_remaining: u32,
}

impl TxInfo {
    /// Create a new [`TxInfo`] response
    pub fn new(state: TxState, actions_remaining: u32) -> Self {
        Self {
            state,
            reserved: [0u8; 3],
            actions_remaining,
        }
    }
}

/// Signed transaction response APDU, returned once the final action is approved.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                           TX_DIGEST                           /
/// /                   32-byte SHA-256 of preimage                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                          SIGNATURE_R                          /
/// /                     32-byte big-endian scalar                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                          SIGNATURE_S                          /
/// /                     32-byte big-endian scalar                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  RECOVERY_ID  |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct SignedTx {
    /// Transaction digest
    #[encdec(with = "arr")]
    pub digest: [u8; 32],

    /// Signature `r` component
    #[encdec(with = "arr")]
    pub r: [u8; 32],

    /// Signature `s` component
    #[encdec(with = "arr")]
    pub s: [u8; 32],

    /// Signature recovery id
    pub v: u8,
}
