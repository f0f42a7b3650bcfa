// Copyright (c) 2022-2023 The MobileCoin Foundation

//! EOS account / action names
//!
//! Names are packed 64-bit identifiers over the alphabet `.12345a-z`, with 5 bits
//! per character for the first 12 characters and 4 bits for the 13th.

use core::{fmt, str::FromStr};

use heapless::String;

use crate::engine::Error;

/// Maximum rendered name length
pub const NAME_STR_LEN: usize = 13;

/// Symbol to character mapping
const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Packed EOS name
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Name(u64);

impl Name {
    /// Create a [Name] from a raw packed value
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    /// Fetch the raw packed value
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Pack a name from a constant string
    ///
    /// Panics (at compile time for `const` use) on invalid characters or lengths,
    /// see [`Name::from_str`] for fallible parsing.
    pub const fn from_const(s: &str) -> Self {
        match pack(s.as_bytes()) {
            Some(v) => Self(v),
            None => panic!("invalid name"),
        }
    }

    /// Render name to a string, eliding trailing `.` filler
    pub fn format(&self) -> String<NAME_STR_LEN> {
        let mut c = [b'.'; NAME_STR_LEN];
        let mut tmp = self.0;

        for i in 0..NAME_STR_LEN {
            let (mask, shift) = match i {
                0 => (0x0f, 4),
                _ => (0x1f, 5),
            };

            c[NAME_STR_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }

        let n = c.iter().rposition(|v| *v != b'.').map(|i| i + 1).unwrap_or(0);

        let mut s = String::new();
        for v in &c[..n] {
            // Capacity is the full name length so this can not fail
            let _ = s.push(*v as char);
        }

        s
    }
}

/// Map a character to its 5-bit symbol value
const fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some((c - b'a') as u64 + 6),
        b'1'..=b'5' => Some((c - b'1') as u64 + 1),
        b'.' => Some(0),
        _ => None,
    }
}

/// Pack name bytes, returning `None` for invalid characters or lengths
const fn pack(b: &[u8]) -> Option<u64> {
    if b.len() > NAME_STR_LEN {
        return None;
    }

    let mut v = 0u64;
    let mut i = 0;

    while i < b.len() {
        let c = match char_to_symbol(b[i]) {
            Some(c) => c,
            None => return None,
        };

        if i < NAME_STR_LEN - 1 {
            v |= c << (64 - 5 * (i + 1));
        } else if c > 0x0f {
            // 13th character only has 4 bits available
            return None;
        } else {
            v |= c;
        }

        i += 1;
    }

    Some(v)
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        pack(s.as_bytes()).map(Self).ok_or(Error::InvalidName)
    }
}

impl From<u64> for Name {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({} / {:016x})", self.format(), self.0)
    }
}
