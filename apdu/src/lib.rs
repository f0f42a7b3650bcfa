// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for EOS transaction signing
//!
//! This module provides a protocol specification and reference implementation for communication
//! with the EOS signing application.
//!
//! APDUs use a primitive binary encoding to simplify implementation on constrained platforms,
//! transactions are streamed to the device one action at a time so the full transaction never
//! needs to be held in memory.
//!
//! Encodings are intended to be _roughly_ equivalent to packed c structures while maintaining
//! 32-bit field alignment to reduce the need for unaligned access on constrained platforms.
//! All field encodings are little-endian, matching the EOS chain serialisation.
//!
//! ## Signing flow
//!
//! 1. Issue [`SignTx`][tx::SignTx] with the chain id, transaction header and number of actions,
//!    the device responds with [`TxInfo`][tx::TxInfo] requesting the first action
//! 2. Issue one [`TxActionAck`][tx::TxActionAck] per action, each approved on-device before it
//!    is added to the transaction digest
//! 3. The final [`TxActionAck`][tx::TxActionAck] returns a [`SignedTx`][tx::SignedTx] containing
//!    the transaction digest and canonical signature
//!
//! [`TxAbort`][tx::TxAbort] may be issued at any point to discard a transaction in progress.
//!
//! Public keys for signing accounts are fetched with [`PublicKeyReq`][public_key::PublicKeyReq].

#![no_std]

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod prelude;
pub mod public_key;
pub mod state;
pub mod tx;

mod helpers;

/// EOS signer APDU Class
pub const EOS_APDU_CLA: u8 = 0xe5;

/// Protocol version, incremented on changes to APDU or digest encodings,
/// reported in [`PublicKeyResp`][public_key::PublicKeyResp]
pub const EOS_PROTO_VERSION: u8 = 0x01;

/// Maximum number of authorizations (permission levels) per action
pub const MAX_AUTHORIZATIONS: usize = 8;

/// Maximum BIP-0032 derivation path length
pub const MAX_PATH_LEN: usize = 8;

/// EOS signer APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch an EOS public key
    GetPublicKey = 0x10,

    /// Initialise a transaction
    SignTx = 0x20,

    /// Provide the next action for the transaction
    TxActionAck = 0x21,

    /// Abort a transaction in progress
    TxAbort = 0x50,

    /// Fetch transaction state
    TxGetInfo = 0x51,
}

/// Helper macro for encoding `bitflags` types
#[macro_export]
macro_rules! encdec_bitflags {
    ($b:ty) => {
        impl encdec::Encode for $b {
            type Error = ApduError;

            fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode(&bits, buff).map_err(|e| e.into())
            }

            fn encode_len(&self) -> Result<usize, Self::Error> {
                let bits: u8 = self.bits();
                encdec::Encode::encode_len(&bits).map_err(|e| e.into())
            }
        }

        impl encdec::DecodeOwned for $b {
            type Output = $b;
            type Error = ApduError;

            fn decode_owned(buff: &[u8]) -> Result<(Self, usize), Self::Error> {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }

                let v = <$b>::from_bits(buff[0]).ok_or(ApduError::InvalidEncoding)?;
                Ok((v, 1))
            }
        }
    };
}
