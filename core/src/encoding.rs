// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Canonical EOS serialisation primitives
//!
//! These write directly into a running hash (or any other [`Update`] sink)
//! rather than a buffer, so transactions can be digested as they are streamed
//! without being held in memory.
//!
//! Fixed-width fields are little-endian, counts and lengths use the LEB128 style
//! variable length encoding from `fc::raw` (see [`encode_varint`]).

use sha2::digest::Update;

use crate::{
    asset::Asset,
    engine::{ActionCommon, Error, PermissionLevel},
    name::Name,
};

/// Encoding used for the context-free-action and action counts in the
/// transaction digest, `1` for variable length (LEB128) counts.
///
/// Changing this alters every transaction digest so must be accompanied by
/// a protocol version bump.
pub const COUNT_ENCODING_VERSION: u8 = 1;

/// Compute the encoded length of a variable length integer
pub const fn varint_len(mut v: u64) -> usize {
    let mut n = 1;
    while v >= 0x80 {
        v >>= 7;
        n += 1;
    }
    n
}

/// Encode a variable length unsigned integer, 7 bits per byte little-endian
/// with the high bit set on every byte but the last
pub fn encode_varint<H: Update>(h: &mut H, mut v: u64) {
    loop {
        let mut b = (v & 0x7f) as u8;
        v >>= 7;

        if v > 0 {
            b |= 0x80;
        }

        h.update(&[b]);

        if v == 0 {
            break;
        }
    }
}

/// Encode a fixed-width name
pub fn encode_name<H: Update>(h: &mut H, name: Name) {
    h.update(&name.value().to_le_bytes());
}

/// Encode a fixed-width asset (amount then symbol)
pub fn encode_asset<H: Update>(h: &mut H, asset: &Asset) {
    h.update(&asset.amount.to_le_bytes());
    h.update(&asset.symbol.value().to_le_bytes());
}

/// Encode a length-prefixed string, failing without writing anything
/// if the string exceeds `max_len`
pub fn encode_string<H: Update>(h: &mut H, s: &[u8], max_len: usize) -> Result<(), Error> {
    if s.len() > max_len {
        return Err(Error::MemoTooLong);
    }

    encode_varint(h, s.len() as u64);
    if !s.is_empty() {
        h.update(s);
    }

    Ok(())
}

/// Encode a permission level (actor then permission)
pub fn encode_permission_level<H: Update>(h: &mut H, level: &PermissionLevel) {
    encode_name(h, level.actor);
    encode_name(h, level.permission);
}

/// Encode the fields common to every action: account, action name, then the
/// authorization list.
///
/// Fails without writing anything if the authorization list is empty.
pub fn encode_action_common<H: Update>(h: &mut H, common: &ActionCommon) -> Result<(), Error> {
    if common.authorization.is_empty() {
        return Err(Error::MissingAuthorization);
    }

    encode_name(h, common.account);
    encode_name(h, common.name);

    encode_varint(h, common.authorization.len() as u64);
    for a in &common.authorization {
        encode_permission_level(h, a);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test {
    use std::vec::Vec;

    use super::*;
    use crate::{asset::Symbol, consts::*};

    /// [`Update`] implementation capturing encoded bytes
    #[derive(Default)]
    pub struct Capture(pub Vec<u8>);

    impl Update for Capture {
        fn update(&mut self, data: &[u8]) {
            self.0.extend_from_slice(data);
        }
    }

    /// Decode a variable length integer, returning the value and bytes consumed
    pub fn decode_varint(b: &[u8]) -> Option<(u64, usize)> {
        let mut v = 0u64;

        for (i, c) in b.iter().enumerate().take(10) {
            v |= ((c & 0x7f) as u64) << (7 * i);
            if c & 0x80 == 0 {
                return Some((v, i + 1));
            }
        }

        None
    }

    #[test]
    fn varint_vectors() {
        let tests: &[(u64, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (0x7f, &[0x7f]),
            (0x80, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (0x3fff, &[0xff, 0x7f]),
            (0x4000, &[0x80, 0x80, 0x01]),
            (
                u64::MAX,
                &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01],
            ),
        ];

        for (v, e) in tests {
            let mut c = Capture::default();
            encode_varint(&mut c, *v);

            assert_eq!(&c.0, e, "encoding mismatch for {v}");
            assert_eq!(varint_len(*v), e.len());
        }
    }

    #[test]
    fn varint_lengths() {
        for _ in 0..1000 {
            // Spread values across bit lengths
            let v = rand::random::<u64>() >> (rand::random::<u32>() % 64);

            let mut c = Capture::default();
            encode_varint(&mut c, v);

            let bits = 64 - v.leading_zeros() as usize;
            assert_eq!(c.0.len(), bits.div_ceil(7).max(1));
            assert_eq!(decode_varint(&c.0), Some((v, c.0.len())));
        }
    }

    #[test]
    fn encode_strings() {
        let mut c = Capture::default();
        encode_string(&mut c, b"", MAX_MEMO_LEN).unwrap();
        assert_eq!(&c.0, &[0x00]);

        let memo = [b'm'; 200];
        let mut c = Capture::default();
        encode_string(&mut c, &memo, MAX_MEMO_LEN).unwrap();
        assert_eq!(&c.0[..2], &[0xc8, 0x01]);
        assert_eq!(&c.0[2..], &memo[..]);

        // Oversize strings are rejected without touching the hash
        let memo = [b'm'; MAX_MEMO_LEN + 1];
        let mut c = Capture::default();
        assert_eq!(
            encode_string(&mut c, &memo, MAX_MEMO_LEN),
            Err(Error::MemoTooLong)
        );
        assert!(c.0.is_empty());
    }

    #[test]
    fn encode_assets() {
        let mut c = Capture::default();
        encode_asset(&mut c, &Asset::new(7654321, Symbol::new(4, "EOS")));

        assert_eq!(
            &c.0,
            &[
                0xb1, 0xcb, 0x74, 0x00, 0x00, 0x00, 0x00, 0x00, // amount
                0x04, b'E', b'O', b'S', 0x00, 0x00, 0x00, 0x00, // symbol
            ]
        );
    }

    #[test]
    fn encode_common() {
        let common = ActionCommon::new(
            EOSIO_TOKEN,
            TRANSFER,
            &[PermissionLevel::new(
                Name::from_const("alice"),
                Name::from_const("active"),
            )],
        )
        .unwrap();

        let mut c = Capture::default();
        encode_action_common(&mut c, &common).unwrap();

        let mut e = Vec::new();
        e.extend_from_slice(&0x5530ea033482a600u64.to_le_bytes());
        e.extend_from_slice(&0xcdcd3c2d57000000u64.to_le_bytes());
        e.push(0x01);
        e.extend_from_slice(&0x345c850000000000u64.to_le_bytes());
        e.extend_from_slice(&0x3232eda800000000u64.to_le_bytes());

        assert_eq!(c.0, e);
    }

    #[test]
    fn encode_common_requires_authorization() {
        let common = ActionCommon::new(EOSIO_TOKEN, TRANSFER, &[]).unwrap();

        let mut c = Capture::default();
        assert_eq!(
            encode_action_common(&mut c, &common),
            Err(Error::MissingAuthorization)
        );
        assert!(c.0.is_empty());
    }
}
