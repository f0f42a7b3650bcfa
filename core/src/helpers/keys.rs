// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::str::from_utf8;

use k256::ecdsa::SigningKey;
use ripemd::{Digest, Ripemd160};

use crate::{
    apdu::public_key::{PublicKeyKind, PUBLIC_KEY_LEN},
    engine::Error,
};

/// Public key checksum length
const CHECKSUM_LEN: usize = 4;

/// Fetch the compressed public key for a signing key
pub fn public_key(key: &SigningKey) -> [u8; PUBLIC_KEY_LEN] {
    let p = key.verifying_key().to_encoded_point(true);

    let mut b = [0u8; PUBLIC_KEY_LEN];
    b.copy_from_slice(p.as_bytes());
    b
}

/// Render a compressed public key as an EOS key string,
/// `<prefix><base58(key | ripemd160(key)[..4])>`
#[cfg_attr(feature = "noinline", inline(never))]
pub fn fmt_public_key<'a>(
    kind: PublicKeyKind,
    key: &[u8; PUBLIC_KEY_LEN],
    buff: &'a mut [u8],
) -> Result<&'a str, Error> {
    let prefix = match kind {
        PublicKeyKind::Eos => "EOS",
        PublicKeyKind::EosK1 => "EOS_K1_",
        PublicKeyKind::EosR1 => return Err(Error::UnsupportedKey),
    };

    if buff.len() < prefix.len() {
        return Err(Error::EncodingFailed);
    }
    buff[..prefix.len()].copy_from_slice(prefix.as_bytes());

    let mut data = [0u8; PUBLIC_KEY_LEN + CHECKSUM_LEN];
    data[..PUBLIC_KEY_LEN].copy_from_slice(key);
    data[PUBLIC_KEY_LEN..].copy_from_slice(&Ripemd160::digest(key)[..CHECKSUM_LEN]);

    let n = bs58::encode(&data[..])
        .into(&mut buff[prefix.len()..])
        .map_err(|_| Error::EncodingFailed)?;

    from_utf8(&buff[..prefix.len() + n]).map_err(|_| Error::EncodingFailed)
}
