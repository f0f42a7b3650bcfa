// Copyright (c) 2022-2023 The MobileCoin Foundation

//! EOS hardware wallet core
//!
//! This provides a common [Engine][engine::Engine] supporting streamed EOS transaction
//! compilation and signing for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine::Engine] are performed via [Event][engine::Event]s
//! and [Output][engine::Output]s, see [eos_signer_apdu] for APDU objects and wire encodings.
//!
//! ## Executing a transaction
//!
//! Transactions are never held in memory, instead each component is fed into a running
//! SHA-256 of the canonical EOS transaction serialisation as it arrives, once every
//! action has been reviewed and approved on-device the digest is signed.
//!
//! 1. Issue [`SignTx`][eos_signer_apdu::tx::SignTx] with the chain id, transaction header,
//!    number of actions and key derivation path to start a signing session
//! 2. Issue a [`TxActionAck`][eos_signer_apdu::tx::TxActionAck] for each action, these are
//!    checked, presented to the user for approval, then added to the transaction digest
//! 3. On the final action the user is asked to approve the transaction resource budget,
//!    expiry and delay, and a [`SignedTx`][eos_signer_apdu::tx::SignedTx] is returned
//!    containing the transaction digest and canonical signature
//!
//! Any failure or rejection aborts the session and wipes all session state, the host must
//! restart with a new [`SignTx`][eos_signer_apdu::tx::SignTx].
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use eos_signer_apdu::{self as apdu};

pub mod asset;

pub mod consts;

pub mod encoding;

pub mod engine;

pub mod helpers;

pub mod name;
