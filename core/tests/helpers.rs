#![allow(unused)]

use std::collections::VecDeque;

use bip39::{Language, Mnemonic, Seed};
use encdec::{Decode, Encode};
use log::{debug, trace};
use tiny_hderive::bip32::ExtendedPrivKey;
use zeroize::Zeroizing;

use eos_signer_core::{
    apdu::ApduStatic,
    engine::{ConfirmKind, Driver, Engine, Error, Policy},
};

pub const MNEMONIC: &str = "duck deal pretty pen thunder economy wide common goose fit engine main aisle curtain choose cube claim snake enroll detect brief history float unit";

/// BIP-0044 EOS path `m/44'/194'/0'/0/0`
pub const EOS_PATH: [u32; 5] = [0x8000_002c, 0x8000_00c2, 0x8000_0000, 0, 0];

/// EOS mainnet chain id
pub const CHAIN_ID: &str = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";

pub fn init_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

pub fn chain_id() -> [u8; 32] {
    let mut b = [0u8; 32];
    hex::decode_to_slice(CHAIN_ID, &mut b).unwrap();
    b
}

/// Driver implementation for test use
pub struct TestDriver {
    /// BIP39 Mnemonic derived seed
    pub seed: [u8; 64],
    /// Scripted prompt responses, approving once exhausted
    pub answers: VecDeque<bool>,
    /// Prompts presented to the user
    pub prompts: Vec<(ConfirmKind, String, String)>,
    /// Advanced mode policy
    pub advanced: bool,
}

impl TestDriver {
    pub fn new(seed: Seed) -> Self {
        let mut b = [0u8; 64];
        b.copy_from_slice(seed.as_bytes());
        Self {
            seed: b,
            answers: VecDeque::new(),
            prompts: Vec::new(),
            advanced: false,
        }
    }

    /// Create a driver using the test [`MNEMONIC`]
    pub fn from_mnemonic() -> anyhow::Result<Self> {
        let mnemonic = Mnemonic::from_phrase(MNEMONIC, Language::English)?;
        let seed = Seed::new(&mnemonic, "");
        Ok(Self::new(seed))
    }

    /// Queue responses for upcoming prompts
    pub fn answer(&mut self, answers: &[bool]) {
        self.answers.extend(answers.iter().copied());
    }
}

/// Render a BIP-0032 path for derivation
pub fn path_str(path: &[u32]) -> String {
    let mut s = String::from("m");
    for p in path {
        match p & 0x8000_0000 != 0 {
            true => s.push_str(&format!("/{}'", p & !0x8000_0000)),
            false => s.push_str(&format!("/{}", p)),
        }
    }
    s
}

/// Derive the raw secp256k1 secret for a path
pub fn derive_secret(seed: &[u8], path: &[u32]) -> [u8; 32] {
    let k = ExtendedPrivKey::derive(seed, path_str(path).as_str()).unwrap();
    k.secret()
}

impl Driver for TestDriver {
    fn derive_secp256k1(&self, path: &[u32]) -> Result<Zeroizing<[u8; 32]>, Error> {
        let k = ExtendedPrivKey::derive(&self.seed[..], path_str(path).as_str())
            .map_err(|_| Error::KeyDerivation)?;
        Ok(Zeroizing::new(k.secret()))
    }

    fn confirm(&mut self, kind: ConfirmKind, title: &str, body: &str) -> bool {
        debug!("prompt ({kind}) {title}: {body}");

        self.prompts.push((kind, title.to_string(), body.to_string()));
        self.answers.pop_front().unwrap_or(true)
    }

    fn policy_enabled(&self, policy: Policy) -> bool {
        match policy {
            Policy::AdvancedMode => self.advanced,
        }
    }
}

/// Exchange an APDU with the engine, decoding the response
pub fn exchange<'a, REQ, RESP>(
    e: &mut Engine<TestDriver>,
    req: &REQ,
    buff: &'a mut [u8],
) -> Result<RESP, Error>
where
    REQ: Encode + ApduStatic + std::fmt::Debug,
    <REQ as Encode>::Error: std::fmt::Debug,
    RESP: Decode<'a, Output = RESP>,
    <RESP as Decode<'a>>::Error: std::fmt::Debug,
{
    debug!("cmd: {:?}", req);

    let mut cmd = [0u8; 256];
    let n = req.encode(&mut cmd).unwrap();

    assert!(
        n < 250,
        "encoded command maximum length exceeded for: {req:?} ({n} bytes)"
    );

    trace!("encoded: {:02x?}", &cmd[..n]);

    let n = e.apdu(REQ::INS, &cmd[..n], buff)?;

    let (a, _) = RESP::decode(&buff[..n]).unwrap();
    Ok(a)
}
