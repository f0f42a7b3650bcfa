// Copyright (c) 2022-2023 The MobileCoin Foundation

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x01,

    /// No signing session active
    #[cfg_attr(feature = "thiserror", error("signing session not initialised"))]
    NotInitialized = 0x02,

    /// Action received after the declared action count was reached
    #[cfg_attr(feature = "thiserror", error("transaction actions exhausted"))]
    ActionsExhausted = 0x03,

    /// Transaction declares no actions
    #[cfg_attr(feature = "thiserror", error("transaction has no actions"))]
    NoActions = 0x04,

    /// Header field exceeds its chain width
    #[cfg_attr(feature = "thiserror", error("invalid transaction header"))]
    InvalidHeader = 0x05,

    /// Action contract does not match action kind
    #[cfg_attr(feature = "thiserror", error("contract account mismatch"))]
    ContractMismatch = 0x06,

    /// Action name does not match action kind
    #[cfg_attr(feature = "thiserror", error("action name mismatch"))]
    ActionMismatch = 0x07,

    /// Invalid asset symbol or precision
    #[cfg_attr(feature = "thiserror", error("invalid asset"))]
    InvalidAsset = 0x08,

    /// Invalid name
    #[cfg_attr(feature = "thiserror", error("invalid name"))]
    InvalidName = 0x09,

    /// Memo exceeds maximum length
    #[cfg_attr(feature = "thiserror", error("memo too long"))]
    MemoTooLong = 0x0a,

    /// Action data exceeds maximum length
    #[cfg_attr(feature = "thiserror", error("action data too long"))]
    DataTooLong = 0x0b,

    /// Action has no authorizations
    #[cfg_attr(feature = "thiserror", error("missing action authorization"))]
    MissingAuthorization = 0x0c,

    /// Unknown action on a supported contract
    #[cfg_attr(
        feature = "thiserror",
        error("unknown actions cannot be used with supported contracts")
    )]
    UnsupportedContract = 0x0d,

    /// Rejected by the user
    #[cfg_attr(feature = "thiserror", error("action cancelled"))]
    Cancelled = 0x0e,

    /// Signing error
    #[cfg_attr(feature = "thiserror", error("Signing error"))]
    SignError = 0x0f,

    /// Signing key derivation failed
    #[cfg_attr(feature = "thiserror", error("key derivation failed"))]
    KeyDerivation = 0x10,

    /// Pending user approval
    #[cfg_attr(feature = "thiserror", error("pending user approval"))]
    ApprovalPending = 0x11,

    /// Message encoding failed
    #[cfg_attr(feature = "thiserror", error("message encoding failed"))]
    EncodingFailed = 0x12,

    /// Message decoding failed
    #[cfg_attr(feature = "thiserror", error("message decoding failed"))]
    DecodeFailed = 0x13,

    /// Signing requested before every action was compiled
    #[cfg_attr(feature = "thiserror", error("transaction not finished"))]
    NotFinished = 0x14,

    /// Public key kind not supported by the signer
    #[cfg_attr(feature = "thiserror", error("unsupported public key kind"))]
    UnsupportedKey = 0x15,
}

/// Error classes, allowing hosts to distinguish user cancellation
/// from protocol and internal failures
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ErrorKind {
    /// Malformed or mis-sequenced request
    Protocol,
    /// Request content failed validation
    Validation,
    /// Rejected by the user
    Cancelled,
    /// Device side failure
    Internal,
}

impl Error {
    /// Fetch the [`ErrorKind`] for an error
    pub const fn kind(&self) -> ErrorKind {
        use Error::*;

        match self {
            InvalidLength | UnexpectedEvent | NotInitialized | ActionsExhausted | NoActions
            | InvalidHeader | UnsupportedContract | DecodeFailed | NotFinished => {
                ErrorKind::Protocol
            }
            ContractMismatch | ActionMismatch | InvalidAsset | InvalidName | MemoTooLong
            | DataTooLong | MissingAuthorization | UnsupportedKey => ErrorKind::Validation,
            Cancelled => ErrorKind::Cancelled,
            SignError | KeyDerivation | ApprovalPending | EncodingFailed => ErrorKind::Internal,
        }
    }
}
