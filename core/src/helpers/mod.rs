// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prompt rendering, public key and signing helpers

use core::str::from_utf8;

use chrono::{DateTime, Datelike, Timelike, Utc};
use emstr::{helpers::Hex, EncodeStr};

use crate::{
    consts::HEX_PREVIEW_BYTES,
    engine::{Error, TxHeader},
};

mod keys;
pub use keys::{fmt_public_key, public_key};

mod signer;
pub use signer::{is_canonical, sign_canonical};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Bytes per network usage word
const NET_WORD_BYTES: u64 = 8;

/// Buffer length sufficient for any rendered prompt body
pub const PROMPT_BUFF_LEN: usize = 160;

/// Render the resource budget prompt for a transaction header
pub fn fmt_budget<'a>(header: &TxHeader, buff: &'a mut [u8]) -> Result<&'a str, Error> {
    let mut n = emstr::write!(&mut buff[..], "You may be billed for:\n")
        .map_err(|_| Error::EncodingFailed)?;

    let r = match header.max_net_usage_words {
        0 => emstr::write!(&mut buff[n..], "WARNING: Unlimited NET\n"),
        w => emstr::write!(
            &mut buff[n..],
            "At most ",
            w as u64 * NET_WORD_BYTES,
            " bytes NET\n"
        ),
    };
    n += r.map_err(|_| Error::EncodingFailed)?;

    let r = match header.max_cpu_usage_ms {
        0 => emstr::write!(&mut buff[n..], "WARNING: Unlimited CPU"),
        ms => emstr::write!(&mut buff[n..], "At most ", ms as u32, " ms CPU"),
    };
    n += r.map_err(|_| Error::EncodingFailed)?;

    from_utf8(&buff[..n]).map_err(|_| Error::EncodingFailed)
}

/// Render the signing intent prompt, showing expiry (`asctime` format, UTC)
/// and delay (`<h>h<mm>m<ss>s`)
#[cfg_attr(feature = "noinline", inline(never))]
pub fn fmt_sign_intent<'a>(header: &TxHeader, buff: &'a mut [u8]) -> Result<&'a str, Error> {
    let mut n = emstr::write!(
        &mut buff[..],
        "Do you want to sign this EOS transaction?\nExpiry: "
    )
    .map_err(|_| Error::EncodingFailed)?;

    n += write_asctime(header.expiration, &mut buff[n..])?;

    let d = header.delay_sec;
    let (h, m, s) = (d / 3600, (d / 60) % 60, d % 60);

    n += emstr::write!(&mut buff[n..], " UTC\nDelay: ", h, 'h')
        .map_err(|_| Error::EncodingFailed)?;
    n += write_padded(m, &mut buff[n..])?;
    n += emstr::write!(&mut buff[n..], 'm').map_err(|_| Error::EncodingFailed)?;
    n += write_padded(s, &mut buff[n..])?;
    n += emstr::write!(&mut buff[n..], 's').map_err(|_| Error::EncodingFailed)?;

    from_utf8(&buff[..n]).map_err(|_| Error::EncodingFailed)
}

/// Render a hex preview of raw action data as `<len>:<hex>`,
/// truncated with `..` where the data exceeds [`HEX_PREVIEW_BYTES`]
pub fn fmt_hex_preview<'a>(data: &[u8], buff: &'a mut [u8]) -> Result<&'a str, Error> {
    let r = match data.len() > HEX_PREVIEW_BYTES {
        true => emstr::write!(
            &mut buff[..],
            data.len(),
            ':',
            Hex(&data[..HEX_PREVIEW_BYTES - 1]),
            ".."
        ),
        false => emstr::write!(&mut buff[..], data.len(), ':', Hex(data)),
    };
    let n = r.map_err(|_| Error::EncodingFailed)?;

    from_utf8(&buff[..n]).map_err(|_| Error::EncodingFailed)
}

/// Write a unix timestamp in `asctime` format (`Thu Jan  1 00:00:00 1970`)
fn write_asctime(secs: u32, buff: &mut [u8]) -> Result<usize, Error> {
    let t = DateTime::<Utc>::from_timestamp(secs as i64, 0).ok_or(Error::EncodingFailed)?;

    let weekday = WEEKDAYS[t.weekday().num_days_from_monday() as usize];
    let month = MONTHS[t.month0() as usize];

    // Day of month is space padded to two characters
    let day_pad = match t.day() < 10 {
        true => "  ",
        false => " ",
    };

    let mut n = emstr::write!(&mut buff[..], weekday, ' ', month, day_pad, t.day(), ' ')
        .map_err(|_| Error::EncodingFailed)?;

    n += write_padded(t.hour(), &mut buff[n..])?;
    n += emstr::write!(&mut buff[n..], ':').map_err(|_| Error::EncodingFailed)?;
    n += write_padded(t.minute(), &mut buff[n..])?;
    n += emstr::write!(&mut buff[n..], ':').map_err(|_| Error::EncodingFailed)?;
    n += write_padded(t.second(), &mut buff[n..])?;
    n += emstr::write!(&mut buff[n..], ' ', t.year() as u32).map_err(|_| Error::EncodingFailed)?;

    Ok(n)
}

/// Write a value zero-padded to two digits
fn write_padded(v: u32, buff: &mut [u8]) -> Result<usize, Error> {
    let r = match v < 10 {
        true => emstr::write!(&mut buff[..], '0', v),
        false => emstr::write!(&mut buff[..], v),
    };
    r.map_err(|_| Error::EncodingFailed)
}
