//! Minimal Solidity ABI tuple codec
//!
//! Produces the same bytes as `abi.encode(...)` for the value kinds the bridge
//! signs over: `uint256` (and the narrower uints, which share its layout),
//! `bool`, `bytes32`, `bytes` and `string`.
//!
//! # Layout
//! A tuple of `n` values has a head of `n` 32-byte words. Static values sit in
//! their head word. Dynamic values put a byte offset (relative to the start of
//! the tuple) in their head word, and their data in the tail as a 32-byte
//! length word followed by the bytes right-padded to a word boundary.
//!
//! Decoding is strict: a blob is accepted only if re-encoding the decoded
//! values reproduces it byte for byte, which rules out non-canonical offsets,
//! dirty padding and trailing data.

use cosmwasm_std::{Uint128, Uint256};
use thiserror::Error;

pub const WORD: usize = 32;

/// A single ABI value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Uint(Uint256),
    Bool(bool),
    FixedBytes32([u8; 32]),
    Bytes(Vec<u8>),
    String(String),
}

impl Token {
    pub fn uint8(value: u8) -> Self {
        Token::Uint(Uint256::from(value))
    }

    pub fn uint64(value: u64) -> Self {
        Token::Uint(Uint256::from(value))
    }

    pub fn uint128(value: Uint128) -> Self {
        Token::Uint(Uint256::from(value))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AbiError {
    #[error("data too short: need {needed} bytes, have {available}")]
    OutOfBounds { needed: usize, available: usize },

    #[error("word {index} does not fit in {target}")]
    ValueOverflow { index: usize, target: &'static str },

    #[error("word {index} is not a valid bool")]
    InvalidBool { index: usize },

    #[error("string at word {index} is not valid utf-8")]
    InvalidUtf8 { index: usize },

    #[error("non-canonical encoding")]
    NonCanonical,
}

/// Encodes `tokens` as a tuple, equivalent to `abi.encode(t0, t1, ...)`.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Uint(value) => head.extend_from_slice(&value.to_be_bytes()),
            Token::Bool(value) => head.extend_from_slice(&uint_word(*value as u64)),
            Token::FixedBytes32(value) => head.extend_from_slice(value),
            Token::Bytes(data) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                encode_dynamic(&mut tail, data);
            }
            Token::String(data) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                encode_dynamic(&mut tail, data.as_bytes());
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Left-pads an integer into a 32-byte big-endian word.
pub fn uint_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn encode_dynamic(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&uint_word(data.len() as u64));
    out.extend_from_slice(data);
    let rem = data.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + (WORD - rem), 0);
    }
}

/// Random-access reader over an encoded tuple.
pub struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Decoder { data }
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = start.checked_add(len).ok_or(AbiError::OutOfBounds {
            needed: usize::MAX,
            available: self.data.len(),
        })?;
        self.data.get(start..end).ok_or(AbiError::OutOfBounds {
            needed: end,
            available: self.data.len(),
        })
    }

    fn word(&self, index: usize) -> Result<&'a [u8], AbiError> {
        self.slice(index * WORD, WORD)
    }

    /// Reads a word that must fit in a `u64` (offsets, lengths, block heights).
    fn small_uint(&self, index: usize, word: &[u8]) -> Result<u64, AbiError> {
        if word[..24].iter().any(|b| *b != 0) {
            return Err(AbiError::ValueOverflow {
                index,
                target: "u64",
            });
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[24..]);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn uint(&self, index: usize) -> Result<Uint256, AbiError> {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.word(index)?);
        Ok(Uint256::from_be_bytes(buf))
    }

    pub fn uint64(&self, index: usize) -> Result<u64, AbiError> {
        let word = self.word(index)?;
        self.small_uint(index, word)
    }

    pub fn boolean(&self, index: usize) -> Result<bool, AbiError> {
        match self.uint64(index)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(AbiError::InvalidBool { index }),
        }
    }

    pub fn fixed_bytes32(&self, index: usize) -> Result<[u8; 32], AbiError> {
        let mut buf = [0u8; 32];
        buf.copy_from_slice(self.word(index)?);
        Ok(buf)
    }

    pub fn bytes(&self, index: usize) -> Result<Vec<u8>, AbiError> {
        let offset = self.uint64(index)? as usize;
        let len_word = self.slice(offset, WORD)?;
        let len = self.small_uint(index, len_word)? as usize;
        let start = offset.checked_add(WORD).ok_or(AbiError::NonCanonical)?;
        Ok(self.slice(start, len)?.to_vec())
    }

    pub fn string(&self, index: usize) -> Result<String, AbiError> {
        String::from_utf8(self.bytes(index)?).map_err(|_| AbiError::InvalidUtf8 { index })
    }
}

/// Rejects `data` unless it is exactly the canonical encoding of `tokens`.
pub fn ensure_canonical(data: &[u8], tokens: &[Token]) -> Result<(), AbiError> {
    if encode(tokens) != data {
        return Err(AbiError::NonCanonical);
    }
    Ok(())
}
