// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Arbitrary contract actions, signed as raw action data

use emstr::EncodeStr;
use sha2::digest::Update;

use crate::{
    consts::{EOSIO, EOSIO_TOKEN, MAX_ACTION_DATA_LEN},
    encoding::{encode_action_common, encode_varint},
    engine::{ConfirmKind, Driver, Error, Policy},
    helpers::{fmt_hex_preview, PROMPT_BUFF_LEN},
    name::NAME_STR_LEN,
};

use super::{body, confirm, ActionCommon};

const ADVANCED_MODE_WARNING: &str = "Signing of arbitrary EOS actions is recommended only for experienced users. Enable 'AdvancedMode' policy to dismiss.";

/// Unrecognised action with raw (pre-serialised) action data
#[derive(Clone, PartialEq, Debug)]
pub struct Unknown<'a> {
    pub data: &'a [u8],
}

impl<'a> Unknown<'a> {
    pub(crate) fn compile<DRV: Driver, H: Update>(
        &self,
        drv: &mut DRV,
        common: &ActionCommon,
        h: &mut H,
    ) -> Result<(), Error> {
        // Supported contracts must use their typed actions
        if common.account == EOSIO || common.account == EOSIO_TOKEN {
            return Err(Error::UnsupportedContract);
        }
        if common.authorization.is_empty() {
            return Err(Error::MissingAuthorization);
        }
        if self.data.len() > MAX_ACTION_DATA_LEN {
            return Err(Error::DataTooLong);
        }

        if !drv.policy_enabled(Policy::AdvancedMode) {
            #[cfg(feature = "log")]
            log::warn!("unknown action refused, advanced mode disabled");

            // Acknowledge only, the action is refused regardless
            let _ = drv.confirm(ConfirmKind::Warning, "Warning", ADVANCED_MODE_WARNING);

            return Err(Error::Cancelled);
        }

        let (account, name) = (common.account.format(), common.name.format());

        let mut title = [0u8; NAME_STR_LEN * 2 + 1];
        let n = emstr::write!(&mut title[..], account.as_str(), ':', name.as_str())
            .map_err(|_| Error::EncodingFailed)?;
        let title = body(&title, n)?;

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let preview = fmt_hex_preview(self.data, &mut buff)?;

        confirm(drv, ConfirmKind::Action, title, preview)?;

        encode_action_common(h, common)?;
        encode_varint(h, self.data.len() as u64);
        h.update(self.data);

        Ok(())
    }
}
