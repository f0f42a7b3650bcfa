//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    public_key::{PublicKeyKind, PublicKeyReq, PublicKeyResp},
    state::TxState,
    tx::{
        ActionKind, ActionPayload, Asset, DelegateFlags, PermissionLevel, SignTx, SignedTx,
        TxAbort, TxActionAck, TxHeader, TxInfo, TxInfoReq,
    },
    ApduError, ApduStatic, Instruction,
};
