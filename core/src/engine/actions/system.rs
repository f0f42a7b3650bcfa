// Copyright (c) 2022-2023 The MobileCoin Foundation

//! `eosio` system contract actions (resource delegation and refunds)

use emstr::EncodeStr;
use sha2::digest::Update;

use crate::{
    asset::Asset,
    consts::{DELEGATEBW, EOSIO, REFUND, UNDELEGATEBW},
    encoding::{encode_action_common, encode_asset, encode_name, encode_varint},
    engine::{ConfirmKind, Driver, Error},
    helpers::PROMPT_BUFF_LEN,
    name::Name,
};

use super::{body, confirm, ActionCommon};

/// Delegate action data length (names, assets, transfer flag)
const DELEGATE_DATA_LEN: u64 = 8 + 8 + 16 + 16 + 1;

/// Undelegate action data length (names, assets)
const UNDELEGATE_DATA_LEN: u64 = 8 + 8 + 16 + 16;

/// Refund action data length (owner)
const REFUND_DATA_LEN: u64 = 8;

/// Stake NET / CPU resources
#[derive(Clone, PartialEq, Debug)]
pub struct Delegate {
    pub sender: Name,
    pub receiver: Name,
    pub net_quantity: Asset,
    pub cpu_quantity: Asset,
    /// Transfer staked tokens to the receiver
    pub transfer: bool,
}

/// Unstake NET / CPU resources
#[derive(Clone, PartialEq, Debug)]
pub struct Undelegate {
    pub sender: Name,
    pub receiver: Name,
    pub net_quantity: Asset,
    pub cpu_quantity: Asset,
}

/// Reclaim unstaked tokens
#[derive(Clone, PartialEq, Debug)]
pub struct Refund {
    pub owner: Name,
}

impl Delegate {
    pub(crate) fn compile<DRV: Driver, H: Update>(
        &self,
        drv: &mut DRV,
        common: &ActionCommon,
        h: &mut H,
    ) -> Result<(), Error> {
        common.check(EOSIO, DELEGATEBW)?;

        let (sender, receiver) = (self.sender.format(), self.receiver.format());
        let cpu = self.cpu_quantity.format()?;
        let net = self.net_quantity.format()?;

        let verb = match self.transfer {
            true => "transfer",
            false => "delegate",
        };

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let n = emstr::write!(
            &mut buff[..],
            "Do you want to ",
            verb,
            " resources from ",
            sender.as_str(),
            " to ",
            receiver.as_str(),
            "?\nCPU: ",
            cpu.as_str(),
            ", NET: ",
            net.as_str()
        )
        .map_err(|_| Error::EncodingFailed)?;

        confirm(drv, ConfirmKind::Action, "Delegate", body(&buff, n)?)?;

        encode_action_common(h, common)?;
        encode_varint(h, DELEGATE_DATA_LEN);

        encode_name(h, self.sender);
        encode_name(h, self.receiver);
        encode_asset(h, &self.net_quantity);
        encode_asset(h, &self.cpu_quantity);
        h.update(&[self.transfer as u8]);

        Ok(())
    }
}

impl Undelegate {
    pub(crate) fn compile<DRV: Driver, H: Update>(
        &self,
        drv: &mut DRV,
        common: &ActionCommon,
        h: &mut H,
    ) -> Result<(), Error> {
        common.check(EOSIO, UNDELEGATEBW)?;

        let (sender, receiver) = (self.sender.format(), self.receiver.format());
        let cpu = self.cpu_quantity.format()?;
        let net = self.net_quantity.format()?;

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let n = emstr::write!(
            &mut buff[..],
            "Do you want to remove delegation of resources from ",
            sender.as_str(),
            " to ",
            receiver.as_str(),
            "?\nCPU: ",
            cpu.as_str(),
            ", NET: ",
            net.as_str()
        )
        .map_err(|_| Error::EncodingFailed)?;

        confirm(drv, ConfirmKind::Action, "Undelegate", body(&buff, n)?)?;

        encode_action_common(h, common)?;
        encode_varint(h, UNDELEGATE_DATA_LEN);

        encode_name(h, self.sender);
        encode_name(h, self.receiver);
        encode_asset(h, &self.net_quantity);
        encode_asset(h, &self.cpu_quantity);

        Ok(())
    }
}

impl Refund {
    pub(crate) fn compile<DRV: Driver, H: Update>(
        &self,
        drv: &mut DRV,
        common: &ActionCommon,
        h: &mut H,
    ) -> Result<(), Error> {
        common.check(EOSIO, REFUND)?;

        let owner = self.owner.format();

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let n = emstr::write!(
            &mut buff[..],
            "Do you want to reclaim all pending unstaked tokens belonging to ",
            owner.as_str(),
            '?'
        )
        .map_err(|_| Error::EncodingFailed)?;

        confirm(drv, ConfirmKind::Action, "Refund", body(&buff, n)?)?;

        encode_action_common(h, common)?;
        encode_varint(h, REFUND_DATA_LEN);

        encode_name(h, self.owner);

        Ok(())
    }
}
