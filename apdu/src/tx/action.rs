// Copyright (c) 2022-2023 The MobileCoin Foundation

use byteorder::{ByteOrder, LittleEndian};
use encdec::{Decode, DecodeOwned, Encode};
use heapless::Vec;
use ledger_proto::ApduStatic;
use num_enum::TryFromPrimitive;

use crate::{
    encdec_bitflags,
    helpers::{dec_prefixed, enc_prefixed, PREFIX_LEN},
    ApduError, Instruction, EOS_APDU_CLA, MAX_AUTHORIZATIONS,
};

/// Action kinds supported by [`TxActionAck`]
#[derive(Copy, Clone, PartialEq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum ActionKind {
    /// `eosio.token::transfer`
    Transfer = 0x01,
    /// `eosio::delegatebw`
    Delegate = 0x02,
    /// `eosio::undelegatebw`
    Undelegate = 0x03,
    /// `eosio::refund`
    Refund = 0x04,
    /// Any other contract action, passed as raw action data
    Unknown = 0x05,
}

/// Permission level (actor and permission names), authorizing an action
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         ACTOR (u64)                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       PERMISSION (u64)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct PermissionLevel {
    pub actor: u64,
    pub permission: u64,
}

/// Asset quantity, a signed amount and packed precision / ticker symbol
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         AMOUNT (i64)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         SYMBOL (u64)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Asset {
    pub amount: i64,
    pub symbol: u64,
}

impl Encode for Asset {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(16)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < 16 {
            return Err(ApduError::InvalidLength);
        }

        LittleEndian::write_i64(&mut buff[0..], self.amount);
        LittleEndian::write_u64(&mut buff[8..], self.symbol);

        Ok(16)
    }
}

impl DecodeOwned for Asset {
    type Output = Self;
    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 16 {
            return Err(ApduError::InvalidLength);
        }

        let amount = LittleEndian::read_i64(&buff[0..]);
        let symbol = LittleEndian::read_u64(&buff[8..]);

        Ok((Self { amount, symbol }, 16))
    }
}

bitflags::bitflags! {
    /// Resource delegation flags
    pub struct DelegateFlags: u8 {
        /// Transfer ownership of the staked tokens to the receiver
        const TRANSFER = 1 << 0;
    }
}

encdec_bitflags!(DelegateFlags);

/// Action-specific payload, exactly one per [`TxActionAck`]
#[derive(Clone, PartialEq, Debug)]
pub enum ActionPayload<'a> {
    /// Token transfer
    ///
    /// ```text
    /// | SENDER (u64) | RECEIVER (u64) | QUANTITY (asset) | MEMO_LEN (u16) | RESERVED | MEMO |
    /// ```
    Transfer {
        sender: u64,
        receiver: u64,
        quantity: Asset,
        memo: &'a [u8],
    },

    /// Resource delegation
    ///
    /// ```text
    /// | SENDER (u64) | RECEIVER (u64) | NET (asset) | CPU (asset) | FLAGS | RESERVED |
    /// ```
    Delegate {
        sender: u64,
        receiver: u64,
        net_quantity: Asset,
        cpu_quantity: Asset,
        flags: DelegateFlags,
    },

    /// Resource undelegation
    ///
    /// ```text
    /// | SENDER (u64) | RECEIVER (u64) | NET (asset) | CPU (asset) |
    /// ```
    Undelegate {
        sender: u64,
        receiver: u64,
        net_quantity: Asset,
        cpu_quantity: Asset,
    },

    /// Refund of unstaked tokens
    ///
    /// ```text
    /// | OWNER (u64) |
    /// ```
    Refund { owner: u64 },

    /// Unrecognised action with raw action data
    ///
    /// ```text
    /// | DATA_LEN (u16) | RESERVED | DATA |
    /// ```
    Unknown { data: &'a [u8] },
}

impl<'a> ActionPayload<'a> {
    /// Fetch the [`ActionKind`] for a payload
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::Transfer { .. } => ActionKind::Transfer,
            ActionPayload::Delegate { .. } => ActionKind::Delegate,
            ActionPayload::Undelegate { .. } => ActionKind::Undelegate,
            ActionPayload::Refund { .. } => ActionKind::Refund,
            ActionPayload::Unknown { .. } => ActionKind::Unknown,
        }
    }

    fn encode_len(&self) -> usize {
        match self {
            ActionPayload::Transfer { memo, .. } => 8 + 8 + 16 + PREFIX_LEN + memo.len(),
            ActionPayload::Delegate { .. } => 8 + 8 + 16 + 16 + 4,
            ActionPayload::Undelegate { .. } => 8 + 8 + 16 + 16,
            ActionPayload::Refund { .. } => 8,
            ActionPayload::Unknown { data } => PREFIX_LEN + data.len(),
        }
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        match self {
            ActionPayload::Transfer {
                sender,
                receiver,
                quantity,
                memo,
            } => {
                index += sender.encode(&mut buff[index..])?;
                index += receiver.encode(&mut buff[index..])?;
                index += quantity.encode(&mut buff[index..])?;
                index += enc_prefixed(memo, &mut buff[index..])?;
            }
            ActionPayload::Delegate {
                sender,
                receiver,
                net_quantity,
                cpu_quantity,
                flags,
            } => {
                index += sender.encode(&mut buff[index..])?;
                index += receiver.encode(&mut buff[index..])?;
                index += net_quantity.encode(&mut buff[index..])?;
                index += cpu_quantity.encode(&mut buff[index..])?;
                index += flags.encode(&mut buff[index..])?;

                // Padding
                buff[index..][..3].fill(0);
                index += 3;
            }
            ActionPayload::Undelegate {
                sender,
                receiver,
                net_quantity,
                cpu_quantity,
            } => {
                index += sender.encode(&mut buff[index..])?;
                index += receiver.encode(&mut buff[index..])?;
                index += net_quantity.encode(&mut buff[index..])?;
                index += cpu_quantity.encode(&mut buff[index..])?;
            }
            ActionPayload::Refund { owner } => {
                index += owner.encode(&mut buff[index..])?;
            }
            ActionPayload::Unknown { data } => {
                index += enc_prefixed(data, &mut buff[index..])?;
            }
        }

        Ok(index)
    }

    fn decode(kind: ActionKind, buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        // Check fixed payload length, variable fields are checked on read
        let fixed_len = match kind {
            ActionKind::Transfer => 8 + 8 + 16 + PREFIX_LEN,
            ActionKind::Delegate => 8 + 8 + 16 + 16 + 4,
            ActionKind::Undelegate => 8 + 8 + 16 + 16,
            ActionKind::Refund => 8,
            ActionKind::Unknown => PREFIX_LEN,
        };
        if buff.len() < fixed_len {
            return Err(ApduError::InvalidLength);
        }

        let p = match kind {
            ActionKind::Transfer => {
                let (sender, n) = u64::decode(&buff[index..])?;
                index += n;
                let (receiver, n) = u64::decode(&buff[index..])?;
                index += n;
                let (quantity, n) = Asset::decode_owned(&buff[index..])?;
                index += n;
                let (memo, n) = dec_prefixed(&buff[index..])?;
                index += n;

                ActionPayload::Transfer {
                    sender,
                    receiver,
                    quantity,
                    memo,
                }
            }
            ActionKind::Delegate => {
                let (sender, n) = u64::decode(&buff[index..])?;
                index += n;
                let (receiver, n) = u64::decode(&buff[index..])?;
                index += n;
                let (net_quantity, n) = Asset::decode_owned(&buff[index..])?;
                index += n;
                let (cpu_quantity, n) = Asset::decode_owned(&buff[index..])?;
                index += n;

                let (flags, n) = DelegateFlags::decode_owned(&buff[index..])?;
                index += n + 3;

                ActionPayload::Delegate {
                    sender,
                    receiver,
                    net_quantity,
                    cpu_quantity,
                    flags,
                }
            }
            ActionKind::Undelegate => {
                let (sender, n) = u64::decode(&buff[index..])?;
                index += n;
                let (receiver, n) = u64::decode(&buff[index..])?;
                index += n;
                let (net_quantity, n) = Asset::decode_owned(&buff[index..])?;
                index += n;
                let (cpu_quantity, n) = Asset::decode_owned(&buff[index..])?;
                index += n;

                ActionPayload::Undelegate {
                    sender,
                    receiver,
                    net_quantity,
                    cpu_quantity,
                }
            }
            ActionKind::Refund => {
                let (owner, n) = u64::decode(&buff[index..])?;
                index += n;

                ActionPayload::Refund { owner }
            }
            ActionKind::Unknown => {
                let (data, n) = dec_prefixed(&buff[index..])?;
                index += n;

                ActionPayload::Unknown { data }
            }
        };

        Ok((p, index))
    }
}

/// Transaction action APDU, provides the next action for a transaction
/// started with [`SignTx`][super::SignTx].
///
/// Each request carries the common action fields (contract account, action name,
/// authorizations) followed by exactly one [`ActionPayload`], selected by `KIND`.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     KIND      |  AUTH_COUNT   |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        ACCOUNT (u64)                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      ACTION_NAME (u64)                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                         AUTHORIZATION                         /
/// /              (AUTH_COUNT x [`PermissionLevel`])               /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                            PAYLOAD                            /
/// /            (variable length, see [`ActionPayload`])           /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct TxActionAck<'a> {
    /// Contract account
    pub account: u64,
    /// Action name
    pub name: u64,
    /// Authorizations for the action
    pub authorization: Vec<PermissionLevel, MAX_AUTHORIZATIONS>,
    /// Action payload
    pub payload: ActionPayload<'a>,
}

impl<'a> ApduStatic for TxActionAck<'a> {
    const CLA: u8 = EOS_APDU_CLA;
    const INS: u8 = Instruction::TxActionAck as u8;
}

impl<'a> TxActionAck<'a> {
    /// Create a new [`TxActionAck`], fails if `authorization` exceeds [`MAX_AUTHORIZATIONS`]
    pub fn new(
        account: u64,
        name: u64,
        authorization: &[PermissionLevel],
        payload: ActionPayload<'a>,
    ) -> Result<Self, ApduError> {
        let authorization =
            Vec::from_slice(authorization).map_err(|_| ApduError::InvalidLength)?;

        Ok(Self {
            account,
            name,
            authorization,
            payload,
        })
    }
}

impl<'a> Encode for TxActionAck<'a> {
    type Error = ApduError;

    /// Encode a [`TxActionAck`] APDU into the provided buffer
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.payload.kind() as u8;
        buff[1] = self.authorization.len() as u8;
        buff[2..4].fill(0);
        index += 4;

        index += self.account.encode(&mut buff[index..])?;
        index += self.name.encode(&mut buff[index..])?;

        for a in &self.authorization {
            index += a.encode(&mut buff[index..])?;
        }

        index += self.payload.encode(&mut buff[index..])?;

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + 8 + 8 + self.authorization.len() * 16 + self.payload.encode_len())
    }
}

impl<'a> Decode<'a> for TxActionAck<'a> {
    type Output = Self;
    type Error = ApduError;

    /// Decode a [`TxActionAck`] APDU from the provided buffer
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        // Check fixed header length
        if buff.len() < 20 {
            return Err(ApduError::InvalidLength);
        }

        // Unset or unrecognised action kinds are rejected here,
        // so every decoded request carries exactly one payload
        let kind = ActionKind::try_from(buff[0]).map_err(|_| ApduError::InvalidEncoding)?;

        let auth_count = buff[1] as usize;
        if auth_count > MAX_AUTHORIZATIONS {
            return Err(ApduError::InvalidLength);
        }
        index += 4;

        let (account, n) = u64::decode(&buff[index..])?;
        index += n;
        let (name, n) = u64::decode(&buff[index..])?;
        index += n;

        // Check authorization list length
        if buff.len() < index + auth_count * 16 {
            return Err(ApduError::InvalidLength);
        }

        let mut authorization = Vec::new();
        for _ in 0..auth_count {
            let (a, n) = PermissionLevel::decode(&buff[index..])?;
            index += n;

            // Capacity checked against MAX_AUTHORIZATIONS above
            let _ = authorization.push(a);
        }

        let (payload, n) = ActionPayload::decode(kind, &buff[index..])?;
        index += n;

        Ok((
            Self {
                account,
                name,
                authorization,
                payload,
            },
            index,
        ))
    }
}
