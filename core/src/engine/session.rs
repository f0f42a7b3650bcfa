// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Signing session state
//!
//! A [`Session`] owns the running transaction digest, header and signing key
//! for a single transaction, these are wiped when the session is dropped
//! (on completion, abort, or any failure).

use core::sync::atomic::{compiler_fence, Ordering};

use k256::ecdsa::SigningKey;
use sha2::{digest::Update, Digest, Sha256};
use zeroize::Zeroize;

use crate::{
    apdu,
    consts::CHAIN_ID_LEN,
    encoding::encode_varint,
};

use super::Error;

/// SHA-256 block length
const SHA256_BLOCK_LEN: usize = 64;

/// Transaction header, with fields narrowed to their chain widths
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct TxHeader {
    /// Expiration (seconds since unix epoch)
    pub expiration: u32,
    /// Reference block number
    pub ref_block_num: u16,
    /// Reference block prefix
    pub ref_block_prefix: u32,
    /// Maximum network usage in 8-byte words, 0 for unlimited
    pub max_net_usage_words: u32,
    /// Maximum CPU usage in milliseconds, 0 for unlimited
    pub max_cpu_usage_ms: u8,
    /// Delay in seconds
    pub delay_sec: u32,
}

impl Zeroize for TxHeader {
    fn zeroize(&mut self) {
        self.expiration.zeroize();
        self.ref_block_num.zeroize();
        self.ref_block_prefix.zeroize();
        self.max_net_usage_words.zeroize();
        self.max_cpu_usage_ms.zeroize();
        self.delay_sec.zeroize();
    }
}

impl TryFrom<&apdu::tx::TxHeader> for TxHeader {
    type Error = Error;

    /// Narrow a wire header, failing where fields exceed their chain width
    fn try_from(h: &apdu::tx::TxHeader) -> Result<Self, Self::Error> {
        Ok(Self {
            expiration: h.expiration,
            ref_block_num: h
                .ref_block_num
                .try_into()
                .map_err(|_| Error::InvalidHeader)?,
            ref_block_prefix: h.ref_block_prefix,
            max_net_usage_words: h.max_net_usage_words,
            max_cpu_usage_ms: h
                .max_cpu_usage_ms
                .try_into()
                .map_err(|_| Error::InvalidHeader)?,
            delay_sec: h.delay_sec,
        })
    }
}

/// Active signing session
pub struct Session {
    hasher: Sha256,
    header: TxHeader,
    remaining: u32,
    key: Option<SigningKey>,
}

impl Session {
    /// Start a session, hashing the chain id, header and action count
    pub fn new(
        chain_id: &[u8; CHAIN_ID_LEN],
        header: TxHeader,
        num_actions: u32,
        key: SigningKey,
    ) -> Self {
        let mut h = Sha256::new();

        Update::update(&mut h, chain_id);
        Update::update(&mut h, &header.expiration.to_le_bytes());
        Update::update(&mut h, &header.ref_block_num.to_le_bytes());
        Update::update(&mut h, &header.ref_block_prefix.to_le_bytes());
        encode_varint(&mut h, header.max_net_usage_words as u64);
        Update::update(&mut h, &[header.max_cpu_usage_ms]);
        encode_varint(&mut h, header.delay_sec as u64);

        // Context-free actions (always empty)
        encode_varint(&mut h, 0);

        encode_varint(&mut h, num_actions as u64);

        Self {
            hasher: h,
            header,
            remaining: num_actions,
            key: Some(key),
        }
    }

    /// Fetch the transaction header
    pub fn header(&self) -> &TxHeader {
        &self.header
    }

    /// Fetch the number of actions remaining
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Check whether every declared action has been compiled
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Compile the next action via `f`, which is provided with the running digest.
    ///
    /// Fails without calling `f` where no actions remain, the remaining count
    /// is only decremented when `f` succeeds.
    pub(crate) fn next_action<F>(&mut self, f: F) -> Result<u32, Error>
    where
        F: FnOnce(&mut Sha256) -> Result<(), Error>,
    {
        if self.remaining == 0 {
            return Err(Error::ActionsExhausted);
        }

        f(&mut self.hasher)?;

        self.remaining -= 1;

        Ok(self.remaining)
    }

    /// Append the transaction trailer and finalise the digest, returning
    /// the digest and the signing key (removed from the session)
    pub(crate) fn finalize(&mut self) -> Result<([u8; 32], SigningKey), Error> {
        if !self.is_finished() {
            return Err(Error::NotFinished);
        }

        let key = self.key.take().ok_or(Error::SignError)?;

        // Transaction extensions (always empty)
        encode_varint(&mut self.hasher, 0);

        // Context-free data digest placeholder
        Update::update(&mut self.hasher, &[0u8; 32]);

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Digest::finalize_reset(&mut self.hasher));
        wipe(&mut self.hasher);

        Ok((digest, key))
    }

    /// Snapshot the running digest
    #[cfg(test)]
    pub(crate) fn peek(&self) -> [u8; 32] {
        self.hasher.clone().finalize().into()
    }
}

/// Reset a hasher, overwriting any buffered preimage bytes.
///
/// [`Digest::reset`] only rewinds the block buffer position, the first
/// write places one byte at the start of the buffer and the second fills
/// the rest and compresses the (all-zero) block.
fn wipe(h: &mut Sha256) {
    Digest::reset(h);
    Update::update(h, &[0u8]);
    Update::update(h, &[0u8; SHA256_BLOCK_LEN - 1]);
    Digest::reset(h);

    compiler_fence(Ordering::SeqCst);
}

impl Drop for Session {
    fn drop(&mut self) {
        wipe(&mut self.hasher);
        self.header.zeroize();
        self.remaining = 0;

        // SigningKey zeroizes its scalar on drop
        drop(self.key.take());
    }
}
