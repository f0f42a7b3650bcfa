// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Public key APDUs, for fetching EOS public keys for BIP-0032 derived accounts

use byteorder::{ByteOrder, LittleEndian};
use encdec::{Decode, DecodeOwned, Encode};
use heapless::{String, Vec};
use ledger_proto::ApduStatic;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

use crate::{
    helpers::{dec_prefixed, enc_prefixed, PREFIX_LEN},
    ApduError, Instruction, EOS_APDU_CLA, MAX_PATH_LEN,
};

/// Compressed secp256k1 public key length
pub const PUBLIC_KEY_LEN: usize = 33;

/// Maximum rendered public key length (`EOS_K1_` prefix and base58 key with checksum)
pub const PUBLIC_KEY_STR_LEN: usize = 64;

/// Public key rendering
#[derive(Copy, Clone, PartialEq, Debug, Display, EnumIter, TryFromPrimitive)]
#[repr(u8)]
pub enum PublicKeyKind {
    /// Legacy `EOS...` keys
    Eos = 0x00,
    /// `EOS_K1_...` keys
    EosK1 = 0x01,
    /// `EOS_R1_...` keys (secp256r1, unsupported by the signer)
    EosR1 = 0x02,
}

impl Encode for PublicKeyKind {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = *self as u8;
        Ok(1)
    }
}

impl DecodeOwned for PublicKeyKind {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        match Self::try_from(buff[0]) {
            Ok(v) => Ok((v, 1)),
            Err(_) => Err(ApduError::InvalidEncoding),
        }
    }
}

/// Public key request APDU.
///
/// Requests the public key for a BIP-0032 derivation path, optionally
/// displaying the rendered key on-device for confirmation.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     KIND      |   PATH_LEN    |     SHOW      |   RESERVED    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                              PATH                             /
/// /                   (u32 x PATH_LEN, BIP-0032)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct PublicKeyReq {
    /// Public key rendering
    pub kind: PublicKeyKind,
    /// Display the key for on-device confirmation
    pub show: bool,
    /// BIP-0032 derivation path
    pub path: Vec<u32, MAX_PATH_LEN>,
}

impl ApduStatic for PublicKeyReq {
    const CLA: u8 = EOS_APDU_CLA;
    const INS: u8 = Instruction::GetPublicKey as u8;
}

impl PublicKeyReq {
    /// Create a new [`PublicKeyReq`], fails if `path` exceeds [`MAX_PATH_LEN`]
    pub fn new(kind: PublicKeyKind, show: bool, path: &[u32]) -> Result<Self, ApduError> {
        let path = Vec::from_slice(path).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { kind, show, path })
    }
}

impl Encode for PublicKeyReq {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        self.kind.encode(&mut buff[0..])?;
        buff[1] = self.path.len() as u8;
        buff[2] = self.show as u8;
        buff[3] = 0;

        let mut index = 4;
        for p in &self.path {
            LittleEndian::write_u32(&mut buff[index..], *p);
            index += 4;
        }

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + self.path.len() * 4)
    }
}

impl<'a> Decode<'a> for PublicKeyReq {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 4 {
            return Err(ApduError::InvalidLength);
        }

        let (kind, _) = PublicKeyKind::decode_owned(buff)?;
        let path_len = buff[1] as usize;
        let show = match buff[2] {
            0 => false,
            1 => true,
            _ => return Err(ApduError::InvalidEncoding),
        };

        if path_len > MAX_PATH_LEN {
            return Err(ApduError::InvalidLength);
        }
        if buff.len() < 4 + path_len * 4 {
            return Err(ApduError::InvalidLength);
        }

        let mut path = Vec::new();
        for i in 0..path_len {
            // Capacity checked against MAX_PATH_LEN above
            let _ = path.push(LittleEndian::read_u32(&buff[4 + i * 4..]));
        }

        Ok((Self { kind, show, path }, 4 + path_len * 4))
    }
}

/// Public key response APDU.
///
/// Contains the protocol version, compressed public key, and rendered EOS key string.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | PROTO_VERSION |     KIND      |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                           PUBLIC_KEY                          /
/// /                (33-byte compressed secp256k1 key)             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          KEY_STR_LEN          |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                            KEY_STR                            /
/// /                   (UTF-8, KEY_STR_LEN bytes)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct PublicKeyResp {
    /// Signer protocol version
    pub proto_version: u8,
    /// Public key rendering
    pub kind: PublicKeyKind,
    /// Compressed secp256k1 public key
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// Rendered public key
    pub key_str: String<PUBLIC_KEY_STR_LEN>,
}

impl PublicKeyResp {
    /// Create a new [`PublicKeyResp`] for the current protocol version
    pub fn new(
        kind: PublicKeyKind,
        public_key: [u8; PUBLIC_KEY_LEN],
        key_str: &str,
    ) -> Result<Self, ApduError> {
        let key_str = String::try_from(key_str).map_err(|_| ApduError::InvalidLength)?;

        Ok(Self {
            proto_version: crate::EOS_PROTO_VERSION,
            kind,
            public_key,
            key_str,
        })
    }
}

impl Encode for PublicKeyResp {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.proto_version;
        self.kind.encode(&mut buff[1..])?;
        buff[2..4].fill(0);

        buff[4..][..PUBLIC_KEY_LEN].copy_from_slice(&self.public_key);
        let index = 4 + PUBLIC_KEY_LEN;

        let n = enc_prefixed(self.key_str.as_bytes(), &mut buff[index..])?;

        Ok(index + n)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + PUBLIC_KEY_LEN + PREFIX_LEN + self.key_str.len())
    }
}

impl<'a> Decode<'a> for PublicKeyResp {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 4 + PUBLIC_KEY_LEN {
            return Err(ApduError::InvalidLength);
        }

        let proto_version = buff[0];
        let (kind, _) = PublicKeyKind::decode_owned(&buff[1..])?;

        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&buff[4..][..PUBLIC_KEY_LEN]);
        let index = 4 + PUBLIC_KEY_LEN;

        let (s, n) = dec_prefixed(&buff[index..])?;
        let s = core::str::from_utf8(s).map_err(|_| ApduError::InvalidUtf8)?;
        let key_str = String::try_from(s).map_err(|_| ApduError::InvalidLength)?;

        Ok((
            Self {
                proto_version,
                kind,
                public_key,
                key_str,
            },
            index + n,
        ))
    }
}
