// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;
use heapless::String;

use ledger_proto::ApduError;

use crate::apdu::{
    self,
    public_key::{PublicKeyKind, PublicKeyResp, PUBLIC_KEY_LEN, PUBLIC_KEY_STR_LEN},
};

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Request the next action
    ActionRequest { remaining: u32 },

    /// Signed transaction
    SignedTx {
        digest: [u8; 32],
        r: [u8; 32],
        s: [u8; 32],
        v: u8,
    },

    /// Engine state
    State { state: super::State },

    /// EOS public key
    PublicKey {
        kind: PublicKeyKind,
        public_key: [u8; PUBLIC_KEY_LEN],
        key_str: String<PUBLIC_KEY_STR_LEN>,
    },
}

impl Output {
    /// Encode an [`Output`] object to a response [APDU][crate::apdu]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::ActionRequest { remaining } => {
                apdu::tx::TxInfo::new(apdu::state::TxState::Actions, *remaining).encode(buff)
            }
            Output::SignedTx { digest, r, s, v } => apdu::tx::SignedTx {
                digest: *digest,
                r: *r,
                s: *s,
                v: *v,
            }
            .encode(buff),
            Output::State { state } => {
                apdu::tx::TxInfo::new(state.state(), state.value()).encode(buff)
            }
            Output::PublicKey {
                kind,
                public_key,
                key_str,
            } => PublicKeyResp::new(*kind, *public_key, key_str.as_str())?.encode(buff),
        }
    }
}
