// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol limits and well-known contract / action names

use crate::name::Name;

pub use eos_signer_apdu::{MAX_AUTHORIZATIONS, MAX_PATH_LEN};

/// Maximum transfer memo length
pub const MAX_MEMO_LEN: usize = 256;

/// Maximum raw action data length for unrecognised actions
pub const MAX_ACTION_DATA_LEN: usize = 512;

// Variable length fields are u16 length-prefixed on the wire
static_assertions::const_assert!(MAX_ACTION_DATA_LEN <= u16::MAX as usize);
static_assertions::const_assert!(MAX_MEMO_LEN <= MAX_ACTION_DATA_LEN);

/// Maximum number of action data bytes shown in unknown action previews
pub const HEX_PREVIEW_BYTES: usize = 54;

/// Maximum signing attempts when searching for a canonical signature
pub const MAX_SIGN_ATTEMPTS: u32 = 64;

/// Maximum asset precision (decimal places)
pub const MAX_PRECISION: u8 = 18;

/// Chain identifier length
pub const CHAIN_ID_LEN: usize = 32;

/// System contract account
pub const EOSIO: Name = Name::from_const("eosio");

/// Token contract account
pub const EOSIO_TOKEN: Name = Name::from_const("eosio.token");

/// `eosio.token::transfer` action
pub const TRANSFER: Name = Name::from_const("transfer");

/// `eosio::delegatebw` action
pub const DELEGATEBW: Name = Name::from_const("delegatebw");

/// `eosio::undelegatebw` action
pub const UNDELEGATEBW: Name = Name::from_const("undelegatebw");

/// `eosio::refund` action
pub const REFUND: Name = Name::from_const("refund");
