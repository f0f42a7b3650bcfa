// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Canonical secp256k1 signing
//!
//! EOS nodes only accept signatures where both `r` and `s` are encoded without
//! sign-extension padding, so deterministic (RFC 6979) signing is repeated with
//! a per-attempt counter as additional data until a canonical candidate is found.

use ecdsa::{hazmat::SignPrimitive, RecoveryId};
use k256::{ecdsa::SigningKey, FieldBytes};
use sha2::Sha256;

use crate::{consts::MAX_SIGN_ATTEMPTS, engine::Error};

/// Check whether signature components are in EOS canonical form
pub fn is_canonical(r: &[u8; 32], s: &[u8; 32]) -> bool {
    let c = |v: &[u8; 32]| v[0] & 0x80 == 0 && !(v[0] == 0 && v[1] & 0x80 == 0);
    c(r) && c(s)
}

/// Sign a transaction digest, returning canonical `(r, s, v)` signature
/// components with `v` the recovery id
#[cfg_attr(feature = "noinline", inline(never))]
pub fn sign_canonical(key: &SigningKey, digest: &[u8; 32]) -> Result<([u8; 32], [u8; 32], u8), Error> {
    let z = FieldBytes::clone_from_slice(digest);
    let k: &k256::Scalar = key.as_nonzero_scalar().as_ref();

    for attempt in 0..MAX_SIGN_ATTEMPTS {
        let ad = attempt.to_le_bytes();
        let ad = match attempt {
            0 => &ad[..0],
            _ => &ad[..],
        };

        let (mut sig, recid) = k
            .try_sign_prehashed_rfc6979::<Sha256>(&z, ad)
            .map_err(|_| Error::SignError)?;
        let mut recid = recid.ok_or(Error::SignError)?;

        // Enforce low-S, flipping the recovery parity to match
        if let Some(low) = sig.normalize_s() {
            sig = low;
            recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
        }

        // Reduced x-coordinates can not be represented by EOS recovery ids
        if recid.is_x_reduced() {
            continue;
        }

        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);

        if is_canonical(&r, &s) {
            return Ok((r, s, recid.to_byte()));
        }

        #[cfg(feature = "log")]
        log::debug!("non-canonical signature (attempt {})", attempt);
    }

    #[cfg(feature = "log")]
    log::error!("no canonical signature in {} attempts", MAX_SIGN_ATTEMPTS);

    Err(Error::SignError)
}
