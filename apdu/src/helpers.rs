// Copyright (c) 2022-2023 The MobileCoin Foundation

use byteorder::{ByteOrder, LittleEndian};

use crate::ApduError;

/// encdec helper module for fixed-size byte arrays
pub(crate) mod arr {
    use encdec::Error;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < d.len() {
            return Err(Error::Length);
        }

        buff[..d.len()].copy_from_slice(&d[..]);

        Ok(d.len())
    }

    pub fn enc_len<const N: usize>(d: &[u8; N]) -> Result<usize, Error> {
        Ok(d.len())
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), Error> {
        if buff.len() < N {
            return Err(Error::Length);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[..N]);

        Ok((d, N))
    }
}

/// Length of a `u16` length-prefixed (and 32-bit padded) slice header
pub(crate) const PREFIX_LEN: usize = 4;

/// Write a `u16` length-prefixed slice, padding the length field to 32-bits
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |            LENGTH             |            RESERVED           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                             DATA                              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
pub(crate) fn enc_prefixed(d: &[u8], buff: &mut [u8]) -> Result<usize, ApduError> {
    if d.len() > u16::MAX as usize {
        return Err(ApduError::InvalidEncoding);
    }
    if buff.len() < PREFIX_LEN + d.len() {
        return Err(ApduError::InvalidLength);
    }

    LittleEndian::write_u16(&mut buff[..2], d.len() as u16);
    buff[2..PREFIX_LEN].fill(0);
    buff[PREFIX_LEN..][..d.len()].copy_from_slice(d);

    Ok(PREFIX_LEN + d.len())
}

/// Read a `u16` length-prefixed slice, see [enc_prefixed]
pub(crate) fn dec_prefixed(buff: &[u8]) -> Result<(&[u8], usize), ApduError> {
    if buff.len() < PREFIX_LEN {
        return Err(ApduError::InvalidLength);
    }

    let n = LittleEndian::read_u16(&buff[..2]) as usize;

    // Check full buffer length before slicing
    if buff.len() < PREFIX_LEN + n {
        return Err(ApduError::InvalidLength);
    }

    Ok((&buff[PREFIX_LEN..][..n], PREFIX_LEN + n))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prefixed_slices() {
        let mut buff = [0xffu8; 16];

        let n = enc_prefixed(&[0xaa, 0xbb, 0xcc], &mut buff).unwrap();
        assert_eq!(n, 7);
        assert_eq!(&buff[..n], &[0x03, 0x00, 0x00, 0x00, 0xaa, 0xbb, 0xcc]);

        let (d, m) = dec_prefixed(&buff[..n]).unwrap();
        assert_eq!(d, &[0xaa, 0xbb, 0xcc]);
        assert_eq!(m, n);
    }

    #[test]
    fn prefixed_truncated() {
        // Length claims more data than is available
        let buff = [0x08, 0x00, 0x00, 0x00, 0x01, 0x02];
        assert!(matches!(dec_prefixed(&buff), Err(ApduError::InvalidLength)));

        // Header only partially present
        assert!(matches!(dec_prefixed(&buff[..2]), Err(ApduError::InvalidLength)));

        // Output buffer too small
        let mut out = [0u8; 4];
        assert!(matches!(
            enc_prefixed(&[1, 2], &mut out),
            Err(ApduError::InvalidLength)
        ));
    }
}
