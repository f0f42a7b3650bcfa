// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Action compilers
//!
//! Each supported action is checked against its expected contract, presented to
//! the user for approval, and only then written to the transaction digest.
//! A rejected or invalid action never modifies the digest.

use heapless::Vec;
use sha2::digest::Update;

use crate::{apdu, asset::Asset, consts::MAX_AUTHORIZATIONS, name::Name};

use super::{ConfirmKind, Driver, Error};

mod generic;
pub use generic::Unknown;

mod system;
pub use system::{Delegate, Refund, Undelegate};

mod token;
pub use token::Transfer;

/// Permission level authorizing an action
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    /// Create a new permission level
    pub const fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }
}

/// Fields common to every action
#[derive(Clone, PartialEq, Debug)]
pub struct ActionCommon {
    /// Contract account
    pub account: Name,
    /// Action name
    pub name: Name,
    /// Authorizations, must be non-empty
    pub authorization: Vec<PermissionLevel, MAX_AUTHORIZATIONS>,
}

impl ActionCommon {
    /// Create action common fields, fails if `authorization` exceeds [`MAX_AUTHORIZATIONS`]
    pub fn new(account: Name, name: Name, authorization: &[PermissionLevel]) -> Result<Self, Error> {
        let authorization = Vec::from_slice(authorization).map_err(|_| Error::InvalidLength)?;

        Ok(Self {
            account,
            name,
            authorization,
        })
    }

    /// Check the contract account and action name match the expected
    /// values and that at least one authorization is present
    pub(crate) fn check(&self, account: Name, name: Name) -> Result<(), Error> {
        if self.account != account {
            return Err(Error::ContractMismatch);
        }
        if self.name != name {
            return Err(Error::ActionMismatch);
        }
        if self.authorization.is_empty() {
            return Err(Error::MissingAuthorization);
        }
        Ok(())
    }
}

/// Action payloads, exactly one per action
#[derive(Clone, PartialEq, Debug)]
pub enum Action<'a> {
    /// `eosio.token::transfer`
    Transfer(Transfer<'a>),
    /// `eosio::delegatebw`
    Delegate(Delegate),
    /// `eosio::undelegatebw`
    Undelegate(Undelegate),
    /// `eosio::refund`
    Refund(Refund),
    /// Any other action, as raw action data
    Unknown(Unknown<'a>),
}

impl<'a> Action<'a> {
    /// Check, confirm, then hash an action
    #[cfg_attr(feature = "noinline", inline(never))]
    pub(crate) fn compile<DRV: Driver, H: Update>(
        &self,
        drv: &mut DRV,
        common: &ActionCommon,
        h: &mut H,
    ) -> Result<(), Error> {
        match self {
            Action::Transfer(a) => a.compile(drv, common, h),
            Action::Delegate(a) => a.compile(drv, common, h),
            Action::Undelegate(a) => a.compile(drv, common, h),
            Action::Refund(a) => a.compile(drv, common, h),
            Action::Unknown(a) => a.compile(drv, common, h),
        }
    }
}

/// Request user confirmation, mapping rejection to [`Error::Cancelled`]
pub(crate) fn confirm<DRV: Driver>(
    drv: &mut DRV,
    kind: ConfirmKind,
    title: &str,
    body: &str,
) -> Result<(), Error> {
    match drv.confirm(kind, title, body) {
        true => Ok(()),
        false => {
            #[cfg(feature = "log")]
            log::debug!("{} rejected", title);

            Err(Error::Cancelled)
        }
    }
}

/// Render a prompt body to `buff`
pub(crate) fn body(buff: &[u8], n: usize) -> Result<&str, Error> {
    core::str::from_utf8(&buff[..n]).map_err(|_| Error::EncodingFailed)
}

impl From<&apdu::tx::PermissionLevel> for PermissionLevel {
    fn from(p: &apdu::tx::PermissionLevel) -> Self {
        Self {
            actor: Name::new(p.actor),
            permission: Name::new(p.permission),
        }
    }
}

impl From<&apdu::tx::Asset> for Asset {
    fn from(a: &apdu::tx::Asset) -> Self {
        Asset::new(a.amount, crate::asset::Symbol::from_raw(a.symbol))
    }
}

impl<'a> From<&apdu::tx::TxActionAck<'a>> for ActionCommon {
    fn from(a: &apdu::tx::TxActionAck<'a>) -> Self {
        let mut authorization = Vec::new();
        for p in &a.authorization {
            // Both lists share MAX_AUTHORIZATIONS capacity
            let _ = authorization.push(PermissionLevel::from(p));
        }

        Self {
            account: Name::new(a.account),
            name: Name::new(a.name),
            authorization,
        }
    }
}

impl<'a> From<&apdu::tx::ActionPayload<'a>> for Action<'a> {
    fn from(p: &apdu::tx::ActionPayload<'a>) -> Self {
        use apdu::tx::{ActionPayload, DelegateFlags};

        match p {
            ActionPayload::Transfer {
                sender,
                receiver,
                quantity,
                memo,
            } => Action::Transfer(Transfer {
                sender: Name::new(*sender),
                receiver: Name::new(*receiver),
                quantity: quantity.into(),
                memo: *memo,
            }),
            ActionPayload::Delegate {
                sender,
                receiver,
                net_quantity,
                cpu_quantity,
                flags,
            } => Action::Delegate(Delegate {
                sender: Name::new(*sender),
                receiver: Name::new(*receiver),
                net_quantity: net_quantity.into(),
                cpu_quantity: cpu_quantity.into(),
                transfer: flags.contains(DelegateFlags::TRANSFER),
            }),
            ActionPayload::Undelegate {
                sender,
                receiver,
                net_quantity,
                cpu_quantity,
            } => Action::Undelegate(Undelegate {
                sender: Name::new(*sender),
                receiver: Name::new(*receiver),
                net_quantity: net_quantity.into(),
                cpu_quantity: cpu_quantity.into(),
            }),
            ActionPayload::Refund { owner } => Action::Refund(Refund {
                owner: Name::new(*owner),
            }),
            ActionPayload::Unknown { data } => Action::Unknown(Unknown { data: *data }),
        }
    }
}
