// Copyright (c) 2022-2023 The MobileCoin Foundation

//! `eosio.token` contract actions

use emstr::EncodeStr;
use sha2::digest::Update;

use crate::{
    asset::Asset,
    consts::{EOSIO_TOKEN, MAX_MEMO_LEN, TRANSFER},
    encoding::{
        encode_action_common, encode_asset, encode_name, encode_string, encode_varint, varint_len,
    },
    engine::{ConfirmKind, Driver, Error},
    helpers::PROMPT_BUFF_LEN,
    name::Name,
};

use super::{body, confirm, ActionCommon};

/// Token transfer
#[derive(Clone, PartialEq, Debug)]
pub struct Transfer<'a> {
    pub sender: Name,
    pub receiver: Name,
    pub quantity: Asset,
    pub memo: &'a [u8],
}

impl<'a> Transfer<'a> {
    /// Encoded action data length
    fn data_len(&self) -> usize {
        8 + 8 + 16 + varint_len(self.memo.len() as u64) + self.memo.len()
    }

    pub(crate) fn compile<DRV: Driver, H: Update>(
        &self,
        drv: &mut DRV,
        common: &ActionCommon,
        h: &mut H,
    ) -> Result<(), Error> {
        common.check(EOSIO_TOKEN, TRANSFER)?;

        if self.memo.len() > MAX_MEMO_LEN {
            return Err(Error::MemoTooLong);
        }

        let quantity = self.quantity.format()?;
        let (sender, receiver) = (self.sender.format(), self.receiver.format());

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let n = emstr::write!(
            &mut buff[..],
            "Do you want to send ",
            quantity.as_str(),
            " from ",
            sender.as_str(),
            " to ",
            receiver.as_str(),
            '?'
        )
        .map_err(|_| Error::EncodingFailed)?;

        confirm(drv, ConfirmKind::Action, "Transfer", body(&buff, n)?)?;

        encode_action_common(h, common)?;
        encode_varint(h, self.data_len() as u64);

        encode_name(h, self.sender);
        encode_name(h, self.receiver);
        encode_asset(h, &self.quantity);
        encode_string(h, self.memo, MAX_MEMO_LEN)?;

        Ok(())
    }
}
