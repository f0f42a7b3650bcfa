// Copyright (c) 2022-2023 The MobileCoin Foundation

//! EOS asset quantities and symbols

use core::fmt;

use emstr::EncodeStr;
use heapless::String;

use crate::{consts::MAX_PRECISION, engine::Error};

/// Maximum rendered asset length
///
/// Sign, up to 20 integer digits and a decimal point, space, then a 7 character ticker.
pub const ASSET_STR_LEN: usize = 32;

/// Maximum ticker length
pub const TICKER_LEN: usize = 7;

/// Packed asset symbol, precision in the low byte and an up to
/// 7 character upper-case ticker in the remaining bytes
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Symbol(u64);

impl Symbol {
    /// Create a [Symbol] from a raw packed value
    pub const fn from_raw(v: u64) -> Self {
        Self(v)
    }

    /// Pack a symbol from precision and ticker, truncating tickers
    /// longer than [`TICKER_LEN`] (validity is checked on use)
    pub const fn new(precision: u8, ticker: &str) -> Self {
        let b = ticker.as_bytes();
        let mut v = precision as u64;

        let mut i = 0;
        while i < b.len() && i < TICKER_LEN {
            v |= (b[i] as u64) << (8 * (i + 1));
            i += 1;
        }

        Self(v)
    }

    /// Fetch the raw packed value
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Fetch decimal precision
    pub const fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Fetch and validate the ticker
    pub fn ticker(&self) -> Result<String<TICKER_LEN>, Error> {
        let mut s = String::new();
        let mut terminated = false;

        for i in 0..TICKER_LEN {
            let c = (self.0 >> (8 * (i + 1))) as u8;

            match c {
                0 => terminated = true,
                b'A'..=b'Z' if !terminated => {
                    s.push(c as char).map_err(|_| Error::InvalidAsset)?;
                }
                // Non-letters, or characters following the terminator
                _ => return Err(Error::InvalidAsset),
            }
        }

        if s.is_empty() {
            return Err(Error::InvalidAsset);
        }

        Ok(s)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:016x})", self.0)
    }
}

/// Asset quantity
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Asset {
    /// Signed amount in units of `10^-precision`
    pub amount: i64,
    /// Asset symbol
    pub symbol: Symbol,
}

impl Asset {
    /// Create a new asset quantity
    pub const fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    /// Render asset for display, placing the decimal point per the symbol precision
    /// (eg. `765.4321 EOS`).
    ///
    /// Fails on precision exceeding [`MAX_PRECISION`] or invalid tickers.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn format(&self) -> Result<String<ASSET_STR_LEN>, Error> {
        let p = self.symbol.precision();
        if p > MAX_PRECISION {
            return Err(Error::InvalidAsset);
        }
        let p = p as usize;

        let ticker = self.symbol.ticker()?;

        // Write magnitude digits
        let mut digits = [0u8; 20];
        let n = emstr::write!(&mut digits[..], self.amount.unsigned_abs())
            .map_err(|_| Error::InvalidAsset)?;
        let digits = &digits[..n];

        let mut s = String::<ASSET_STR_LEN>::new();
        let mut push = |v: &str| s.push_str(v).map_err(|_| Error::InvalidAsset);

        if self.amount < 0 {
            push("-")?;
        }

        // Integer part, at least one digit
        match n > p {
            true => push(as_str(&digits[..n - p])?)?,
            false => push("0")?,
        }

        // Fractional part, zero padded to the precision
        if p > 0 {
            push(".")?;
            for _ in n..p {
                push("0")?;
            }
            push(as_str(&digits[n.saturating_sub(p)..])?)?;
        }

        push(" ")?;
        push(ticker.as_str())?;

        Ok(s)
    }
}

fn as_str(b: &[u8]) -> Result<&str, Error> {
    core::str::from_utf8(b).map_err(|_| Error::InvalidAsset)
}
