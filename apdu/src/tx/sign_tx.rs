// Copyright (c) 2022-2023 The MobileCoin Foundation

use byteorder::{ByteOrder, LittleEndian};
use encdec::{Decode, Encode};
use heapless::Vec;
use ledger_proto::ApduStatic;

use crate::{ApduError, Instruction, EOS_APDU_CLA, MAX_PATH_LEN};

/// Chain identifier length
pub const CHAIN_ID_LEN: usize = 32;

/// Transaction header fields, as sent over the wire.
///
/// Each field is sent as a 32-bit value, narrower chain fields
/// (`ref_block_num`, `max_cpu_usage_ms`) are range checked by the engine.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          EXPIRATION                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         REF_BLOCK_NUM                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        REF_BLOCK_PREFIX                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                      MAX_NET_USAGE_WORDS                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        MAX_CPU_USAGE_MS                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           DELAY_SEC                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TxHeader {
    /// Expiration (seconds since unix epoch)
    pub expiration: u32,
    /// Reference block number (low 16 bits of block height)
    pub ref_block_num: u32,
    /// Reference block prefix
    pub ref_block_prefix: u32,
    /// Maximum network usage in 8-byte words (0 for unlimited)
    pub max_net_usage_words: u32,
    /// Maximum CPU usage in milliseconds (0 for unlimited)
    pub max_cpu_usage_ms: u32,
    /// Delay in seconds
    pub delay_sec: u32,
}

/// Encoded [`TxHeader`] length
const HEADER_LEN: usize = 24;

/// Transaction initialisation APDU, starts a signing session for a
/// transaction with `num_actions` actions.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | CHAIN_ID_LEN  |   PATH_LEN    |           RESERVED            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          NUM_ACTIONS                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                            CHAIN_ID                           /
/// /                    (32-bytes, CHAIN_ID_LEN)                   /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                            TX_HEADER                          /
/// /                  (24-bytes, see [`TxHeader`])                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                              PATH                             /
/// /                   (u32 x PATH_LEN, BIP-0032)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct SignTx {
    /// Number of actions in the transaction
    pub num_actions: u32,
    /// Chain identifier
    pub chain_id: [u8; CHAIN_ID_LEN],
    /// Transaction header
    pub header: TxHeader,
    /// BIP-0032 derivation path for the signing key
    pub path: Vec<u32, MAX_PATH_LEN>,
}

impl ApduStatic for SignTx {
    const CLA: u8 = EOS_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;
}

impl SignTx {
    /// Create a new [`SignTx`] request, fails if `path` exceeds [`MAX_PATH_LEN`]
    pub fn new(
        chain_id: [u8; CHAIN_ID_LEN],
        header: TxHeader,
        num_actions: u32,
        path: &[u32],
    ) -> Result<Self, ApduError> {
        let path = Vec::from_slice(path).map_err(|_| ApduError::InvalidLength)?;

        Ok(Self {
            num_actions,
            chain_id,
            header,
            path,
        })
    }
}

impl Encode for SignTx {
    type Error = ApduError;

    /// Encode a [`SignTx`] APDU into the provided buffer
    #[inline]
    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        // Check buffer length is valid
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        // Write lengths and padding
        buff[0] = CHAIN_ID_LEN as u8;
        buff[1] = self.path.len() as u8;
        buff[2..4].fill(0);
        index += 4;

        index += self.num_actions.encode(&mut buff[index..])?;

        buff[index..][..CHAIN_ID_LEN].copy_from_slice(&self.chain_id);
        index += CHAIN_ID_LEN;

        index += self.header.encode(&mut buff[index..])?;

        for p in &self.path {
            LittleEndian::write_u32(&mut buff[index..], *p);
            index += 4;
        }

        Ok(index)
    }

    #[inline]
    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(4 + 4 + CHAIN_ID_LEN + HEADER_LEN + self.path.len() * 4)
    }
}

impl<'a> Decode<'a> for SignTx {
    type Output = Self;
    type Error = ApduError;

    /// Decode a [`SignTx`] APDU from the provided buffer
    #[inline]
    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        // Check fixed header length
        if buff.len() < 8 {
            return Err(ApduError::InvalidLength);
        }

        let chain_id_len = buff[0] as usize;
        let path_len = buff[1] as usize;
        index += 4;

        // Chain identifiers are always 32 bytes
        if chain_id_len != CHAIN_ID_LEN {
            return Err(ApduError::InvalidLength);
        }
        if path_len > MAX_PATH_LEN {
            return Err(ApduError::InvalidLength);
        }

        // Check full buffer length
        if buff.len() < 8 + CHAIN_ID_LEN + HEADER_LEN + path_len * 4 {
            return Err(ApduError::InvalidLength);
        }

        let num_actions = LittleEndian::read_u32(&buff[index..]);
        index += 4;

        let mut chain_id = [0u8; CHAIN_ID_LEN];
        chain_id.copy_from_slice(&buff[index..][..CHAIN_ID_LEN]);
        index += CHAIN_ID_LEN;

        let (header, n) = TxHeader::decode(&buff[index..])?;
        index += n;

        let mut path = Vec::new();
        for _ in 0..path_len {
            // Capacity checked against MAX_PATH_LEN above
            let _ = path.push(LittleEndian::read_u32(&buff[index..]));
            index += 4;
        }

        Ok((
            Self {
                num_actions,
                chain_id,
                header,
                path,
            },
            index,
        ))
    }
}
