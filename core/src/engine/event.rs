// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Decode;
use heapless::Vec;
use ledger_proto::{ApduError, ApduStatic};

use eos_signer_apdu::{prelude::*, tx::TxHeader as WireHeader, MAX_PATH_LEN};

use super::{Action, ActionCommon};

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, Debug)]
pub enum Event<'a> {
    /// Start a signing session
    SignTx {
        chain_id: [u8; 32],
        header: WireHeader,
        num_actions: u32,
        path: Vec<u32, MAX_PATH_LEN>,
    },

    /// Compile the next transaction action
    ActionAck {
        common: ActionCommon,
        action: Action<'a>,
    },

    /// Abort any running session
    TxAbort,

    /// Fetch session state
    TxGetInfo,

    /// Fetch an EOS public key
    GetPublicKey {
        kind: PublicKeyKind,
        show: bool,
        path: Vec<u32, MAX_PATH_LEN>,
    },
}

/// Helper for decoding APDUs to events
fn decode_event<'a, T>(buff: &'a [u8]) -> Result<Event<'a>, ApduError>
where
    T: Decode<'a, Error = ApduError>,
    Event<'a>: From<T::Output>,
{
    T::decode(buff).map(|(v, _n)| Event::from(v))
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(ins: u8, buff: &'a [u8]) -> Result<Self, ApduError> {
        match ins {
            SignTx::INS => decode_event::<SignTx>(buff),
            TxActionAck::INS => decode_event::<TxActionAck>(buff),
            TxAbort::INS => decode_event::<TxAbort>(buff),
            TxInfoReq::INS => decode_event::<TxInfoReq>(buff),
            PublicKeyReq::INS => decode_event::<PublicKeyReq>(buff),
            _ => Err(ApduError::InvalidEncoding),
        }
    }
}

impl<'a> From<SignTx> for Event<'a> {
    fn from(a: SignTx) -> Self {
        Event::SignTx {
            chain_id: a.chain_id,
            header: a.header,
            num_actions: a.num_actions,
            path: a.path,
        }
    }
}

impl<'a> From<TxActionAck<'a>> for Event<'a> {
    fn from(a: TxActionAck<'a>) -> Self {
        Event::ActionAck {
            common: ActionCommon::from(&a),
            action: Action::from(&a.payload),
        }
    }
}

impl<'a> From<TxAbort> for Event<'a> {
    fn from(_: TxAbort) -> Self {
        Event::TxAbort
    }
}

impl<'a> From<TxInfoReq> for Event<'a> {
    fn from(_: TxInfoReq) -> Self {
        Event::TxGetInfo
    }
}

impl<'a> From<PublicKeyReq> for Event<'a> {
    fn from(a: PublicKeyReq) -> Self {
        Event::GetPublicKey {
            kind: a.kind,
            show: a.show,
            path: a.path,
        }
    }
}
