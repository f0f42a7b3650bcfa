// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides EOS transaction signing for hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.
//!
//! ## States
//!
//! ```text
//!  Init --SignTx--> Active(n) --ActionAck--> ... --> Finished --(approve)--> Complete
//!                       |                               |
//!                       +------- failure / reject ------+-----> Error
//! ```
//!
//! [`Event::TxAbort`] returns to `Init` from any state, a new [`Event::SignTx`]
//! replaces any session in progress.

use heapless::String;
use k256::ecdsa::SigningKey;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroizing;

use crate::{
    apdu::{
        public_key::{PublicKeyKind, PUBLIC_KEY_LEN, PUBLIC_KEY_STR_LEN},
        state::TxState,
    },
    consts::CHAIN_ID_LEN,
    helpers::{
        fmt_budget, fmt_public_key, fmt_sign_intent, public_key, sign_canonical, PROMPT_BUFF_LEN,
    },
};

mod actions;
pub use actions::{
    Action, ActionCommon, Delegate, PermissionLevel, Refund, Transfer, Undelegate, Unknown,
};

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod error;
pub use error::{Error, ErrorKind};

mod session;
pub use session::{Session, TxHeader};

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no transaction running
    Init,
    /// Compiling actions, with the number of actions remaining
    Active(u32),
    /// All actions compiled, pending signing approval
    Finished,
    /// Transaction signed
    Complete,
    /// Transaction failed or rejected
    Error,
}

impl State {
    /// Fetch the wire [`TxState`] for an engine state
    pub fn state(&self) -> TxState {
        match self {
            State::Init => TxState::Init,
            State::Active(_) => TxState::Actions,
            State::Finished => TxState::Finished,
            State::Complete => TxState::TxComplete,
            State::Error => TxState::Error,
        }
    }

    /// Fetch the state value (actions remaining)
    pub fn value(&self) -> u32 {
        match self {
            State::Active(n) => *n,
            _ => 0,
        }
    }
}

/// Confirmation prompt kinds
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum ConfirmKind {
    /// Approve an action
    Action,
    /// Approve the transaction resource budget
    Budget,
    /// Approve signing (expiry and delay)
    SignTx,
    /// Acknowledge a warning, the response is ignored
    Warning,
    /// Confirm a public key displayed for the host
    PublicKey,
}

/// Device policies
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum Policy {
    /// Permit signing of arbitrary (unknown) actions
    AdvancedMode,
}

/// Signed transaction digest
#[derive(Clone, PartialEq, Debug)]
pub struct TxSignature {
    /// SHA-256 digest of the serialised transaction
    pub digest: [u8; 32],
    /// Signature `r` component
    pub r: [u8; 32],
    /// Signature `s` component
    pub s: [u8; 32],
    /// Recovery id
    pub v: u8,
}

/// EOS public key
#[derive(Clone, PartialEq, Debug)]
pub struct PublicKey {
    /// Public key rendering
    pub kind: PublicKeyKind,
    /// Compressed secp256k1 public key
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// Rendered key string
    pub key_str: String<PUBLIC_KEY_STR_LEN>,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// BIP-0032 derivation of secp256k1 private keys
    fn derive_secp256k1(&self, path: &[u32]) -> Result<Zeroizing<[u8; 32]>, Error>;

    /// Present a prompt to the user, blocking until approved (`true`) or rejected
    fn confirm(&mut self, kind: ConfirmKind, title: &str, body: &str) -> bool;

    /// Check whether a device policy is enabled
    fn policy_enabled(&self, policy: Policy) -> bool;
}

impl<T: Driver> Driver for &mut T {
    fn derive_secp256k1(&self, path: &[u32]) -> Result<Zeroizing<[u8; 32]>, Error> {
        T::derive_secp256k1(self, path)
    }

    fn confirm(&mut self, kind: ConfirmKind, title: &str, body: &str) -> bool {
        T::confirm(self, kind, title, body)
    }

    fn policy_enabled(&self, policy: Policy) -> bool {
        T::policy_enabled(self, policy)
    }
}

/// [Engine] provides hardware-independent support for EOS transaction signing
pub struct Engine<DRV: Driver> {
    state: State,
    unlocked: bool,

    session: Option<Session>,

    drv: DRV,
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new transaction engine instance with the provided driver
    pub const fn new(drv: DRV) -> Self {
        Self {
            state: State::Init,
            unlocked: false,
            session: None,
            drv,
        }
    }

    /// Handle incoming transaction events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        // Session operations abort on failure
        match evt {
            Event::SignTx {
                chain_id,
                header,
                num_actions,
                path,
            } => match TxHeader::try_from(header) {
                Ok(h) => self
                    .init(chain_id, &h, *num_actions, path)
                    .map(|_| Output::ActionRequest {
                        remaining: *num_actions,
                    }),
                Err(e) => Err(self.fail(e)),
            },

            Event::ActionAck { common, action } => match self.compile_action(common, action) {
                Ok(0) => self.sign().map(|s| Output::SignedTx {
                    digest: s.digest,
                    r: s.r,
                    s: s.s,
                    v: s.v,
                }),
                Ok(remaining) => Ok(Output::ActionRequest { remaining }),
                Err(e) => Err(e),
            },

            Event::TxAbort => {
                self.abort();
                Ok(Output::State { state: self.state })
            }

            Event::TxGetInfo => Ok(Output::State { state: self.state }),

            Event::GetPublicKey { kind, show, path } => self
                .get_public_key(*kind, path, *show)
                .map(|k| Output::PublicKey {
                    kind: k.kind,
                    public_key: k.public_key,
                    key_str: k.key_str,
                }),
        }
    }

    /// Decode an APDU, handle the resulting event, and encode the response.
    ///
    /// Returns the encoded response length.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn apdu(&mut self, ins: u8, req: &[u8], resp: &mut [u8]) -> Result<usize, Error> {
        let evt = Event::parse(ins, req).map_err(|_e| {
            #[cfg(feature = "log")]
            log::error!("failed to decode instruction {:02x}: {:?}", ins, _e);

            self.fail(Error::DecodeFailed)
        })?;

        let out = self.update(&evt)?;

        out.encode(resp).map_err(|_| self.fail(Error::EncodingFailed))
    }

    /// Start a signing session, replacing any session in progress
    pub fn init(
        &mut self,
        chain_id: &[u8],
        header: &TxHeader,
        num_actions: u32,
        path: &[u32],
    ) -> Result<(), Error> {
        let r = self.init_session(chain_id, header, num_actions, path);
        r.map_err(|e| self.fail(e))
    }

    fn init_session(
        &mut self,
        chain_id: &[u8],
        header: &TxHeader,
        num_actions: u32,
        path: &[u32],
    ) -> Result<(), Error> {
        if !self.unlocked {
            return Err(Error::ApprovalPending);
        }

        let chain_id: &[u8; CHAIN_ID_LEN] = chain_id.try_into().map_err(|_| Error::InvalidLength)?;

        if num_actions == 0 {
            return Err(Error::NoActions);
        }

        if self.session.is_some() {
            #[cfg(feature = "log")]
            log::warn!("replacing stale signing session");

            self.abort();
        }

        let key = self.drv.derive_secp256k1(path)?;
        let key = SigningKey::from_slice(&key[..]).map_err(|_| Error::KeyDerivation)?;

        self.session = Some(Session::new(chain_id, *header, num_actions, key));
        self.state = State::Active(num_actions);

        #[cfg(feature = "log")]
        log::debug!("session started, {} actions", num_actions);

        Ok(())
    }

    /// Compile the next action, returning the number of actions remaining
    pub fn compile_action(&mut self, common: &ActionCommon, action: &Action) -> Result<u32, Error> {
        let drv = &mut self.drv;
        let r = match self.session.as_mut() {
            Some(s) => s.next_action(|h| action.compile(drv, common, h)),
            None => Err(Error::NotInitialized),
        };

        match r {
            Ok(0) => self.state = State::Finished,
            Ok(n) => self.state = State::Active(n),
            Err(e) => return Err(self.fail(e)),
        }

        r
    }

    /// Sign a finished transaction following user approval of the
    /// resource budget, expiry and delay
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn sign(&mut self) -> Result<TxSignature, Error> {
        let r = self.sign_session();
        r.map_err(|e| self.fail(e))
    }

    fn sign_session(&mut self) -> Result<TxSignature, Error> {
        let session = self.session.as_mut().ok_or(Error::NotInitialized)?;
        if !session.is_finished() {
            return Err(Error::NotFinished);
        }

        let header = *session.header();

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let body = fmt_budget(&header, &mut buff)?;
        if !self.drv.confirm(ConfirmKind::Budget, "Confirm Budget", body) {
            return Err(Error::Cancelled);
        }

        let mut buff = [0u8; PROMPT_BUFF_LEN];
        let body = fmt_sign_intent(&header, &mut buff)?;
        if !self.drv.confirm(ConfirmKind::SignTx, "Sign Transaction", body) {
            return Err(Error::Cancelled);
        }

        // Session is dropped (wiping remaining state) whatever the outcome
        let mut session = self.session.take().ok_or(Error::NotInitialized)?;
        let (digest, key) = session.finalize()?;
        drop(session);

        let (r, s, v) = sign_canonical(&key, &digest)?;
        drop(key);

        self.state = State::Complete;

        #[cfg(feature = "log")]
        log::debug!("transaction signed");

        Ok(TxSignature { digest, r, s, v })
    }

    /// Fetch the EOS public key for a derivation path, displaying it for
    /// confirmation where `show` is set
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn get_public_key(
        &mut self,
        kind: PublicKeyKind,
        path: &[u32],
        show: bool,
    ) -> Result<PublicKey, Error> {
        let r = self.derive_public_key(kind, path, show);
        r.map_err(|e| self.fail(e))
    }

    fn derive_public_key(
        &mut self,
        kind: PublicKeyKind,
        path: &[u32],
        show: bool,
    ) -> Result<PublicKey, Error> {
        if !self.unlocked {
            return Err(Error::ApprovalPending);
        }

        // secp256r1 keys are never derived
        if kind == PublicKeyKind::EosR1 {
            return Err(Error::UnsupportedKey);
        }

        let secret = self.drv.derive_secp256k1(path)?;
        let key = SigningKey::from_slice(&secret[..]).map_err(|_| Error::KeyDerivation)?;
        let pk = public_key(&key);
        drop(key);

        let mut buff = [0u8; PUBLIC_KEY_STR_LEN];
        let key_str = fmt_public_key(kind, &pk, &mut buff)?;

        if show && !self.drv.confirm(ConfirmKind::PublicKey, "EOS Public Key", key_str) {
            return Err(Error::Cancelled);
        }

        #[cfg(feature = "log")]
        log::debug!("public key: {}", key_str);

        Ok(PublicKey {
            kind,
            public_key: pk,
            key_str: String::try_from(key_str).map_err(|_| Error::EncodingFailed)?,
        })
    }

    /// Abort any session in progress, wiping session state
    pub fn abort(&mut self) {
        self.session = None;
        self.state = State::Init;
    }

    /// Abort on failure, returning the causing error
    fn fail(&mut self, e: Error) -> Error {
        #[cfg(feature = "log")]
        log::error!("transaction failed: {:?} ({:?})", e, e.kind());

        self.session = None;
        self.state = State::Error;

        e
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Check whether a signing session is active
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Check whether every declared action has been compiled
    pub fn is_finished(&self) -> bool {
        self.session.as_ref().map(|s| s.is_finished()).unwrap_or(false)
    }

    /// Fetch the number of actions remaining
    pub fn remaining(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.remaining())
    }

    /// Fetch the engine driver
    pub fn driver(&mut self) -> &mut DRV {
        &mut self.drv
    }

    /// Fetch unlock state
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlock the engine (following PIN entry)
    pub fn unlock(&mut self) {
        self.unlocked = true;
    }

    /// Lock the engine, aborting any session in progress
    pub fn lock(&mut self) {
        self.unlocked = false;
        self.abort();
    }
}
