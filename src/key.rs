//! Key objects: validation of raw key material, the single/triple stage
//! cascade, and the public [`DesKey`] type.

use std::fmt;
use std::slice;

use log::trace;

use crate::error::{Error, Result};
use crate::feistel::{encode_block, Direction};
use crate::modes::{handle, Iv};
use crate::schedule::{derive_keys, RoundKeys};

/// The ordered round-key stages derived from one raw key, in encryption
/// order.
///
/// Single DES carries one stage; Triple DES carries three, run
/// encrypt-decrypt-encrypt. The variant is explicit rather than
/// inferred from a collection length, so degenerate 16/24-byte keys
/// that collapse to one stage really are `Single`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) enum KeySchedule {
    Single(RoundKeys),
    Triple(Box<[RoundKeys; 3]>),
}

impl KeySchedule {
    /// The stages in encryption order.
    pub(crate) fn stages(&self) -> &[RoundKeys] {
        match self {
            KeySchedule::Single(keys) => slice::from_ref(keys),
            KeySchedule::Triple(keys) => &keys[..],
        }
    }
}

/// Run one 64-bit block through every stage of the cascade.
///
/// The per-stage direction flips after each stage, giving the standard
/// EDE pattern for three stages and a plain single pass for one.
/// Decryption walks the stages in reverse with the flags inverted, so
/// the whole cascade inverts exactly.
pub(crate) fn encode(block: u64, schedule: &KeySchedule, direction: Direction) -> u64 {
    let mut block = block;
    let mut dir = direction;
    match direction {
        Direction::Encrypt => {
            for stage in schedule.stages() {
                block = encode_block(block, stage, dir);
                dir = dir.flip();
            }
        }
        Direction::Decrypt => {
            for stage in schedule.stages().iter().rev() {
                block = encode_block(block, stage, dir);
                dir = dir.flip();
            }
        }
    }
    block
}

/// Validate raw key bytes and derive the stage cascade.
///
/// Keys of 8, 16, or 24 bytes split into sub-keys `k0`, `k1`, `k2`
/// (missing ones empty). Degenerate combinations collapse to single
/// DES so that e.g. a 16-byte key with both halves equal produces
/// output identical to the plain 8-byte key:
///
/// 1. `k1 == k2` (both empty for an 8-byte key): single DES under `k0`.
/// 2. A 16-byte key reuses `k0` as its third stage (two-key 3DES).
/// 3. After that, `k1 == k0`: single DES under `k2`.
/// 4. Otherwise: three independent stages.
fn guard_key(key: &[u8]) -> Result<KeySchedule> {
    if !matches!(key.len(), 8 | 16 | 24) {
        return Err(Error::InvalidKey { length: key.len() });
    }

    let k0 = &key[..8];
    let k1 = &key[8..key.len().min(16)];
    let k2 = &key[key.len().min(16)..];

    if k1 == k2 {
        return Ok(KeySchedule::Single(derive_keys(k0)));
    }
    let k2 = if k2.is_empty() { k0 } else { k2 };
    if k1 == k0 {
        return Ok(KeySchedule::Single(derive_keys(k2)));
    }
    Ok(KeySchedule::Triple(Box::new([
        derive_keys(k0),
        derive_keys(k1),
        derive_keys(k2),
    ])))
}

/// A DES or Triple-DES key.
///
/// Construction derives and caches the round subkeys once; the object
/// is immutable afterwards and freely shareable across threads. Two
/// keys compare equal (and hash alike) when their derived schedules
/// match, so raw keys that differ only in parity bits, or degenerate
/// 16/24-byte keys and their 8-byte equivalent, are interchangeable.
///
/// ```
/// use deskey::DesKey;
///
/// let key = DesKey::new(b"8bytekey")?;
/// let secret = key.encrypt(b"hello world", None, true)?;
/// assert_eq!(key.decrypt(&secret, None, true)?, b"hello world");
/// # Ok::<(), deskey::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DesKey {
    schedule: KeySchedule,
}

impl DesKey {
    /// Construct a key object from 8, 16, or 24 raw key bytes.
    ///
    /// Parity bits are ignored, per DES. Fails with
    /// [`Error::InvalidKey`] for any other length.
    pub fn new(key: &[u8]) -> Result<Self> {
        let schedule = guard_key(key)?;
        trace!(
            "derived {} stage(s) from a {}-byte key",
            schedule.stages().len(),
            key.len()
        );
        Ok(Self { schedule })
    }

    /// Whether this key runs the single-DES algorithm (one stage).
    pub fn is_single(&self) -> bool {
        matches!(self.schedule, KeySchedule::Single(_))
    }

    /// Whether this key runs the Triple-DES algorithm (three stages).
    pub fn is_triple(&self) -> bool {
        matches!(self.schedule, KeySchedule::Triple(_))
    }

    /// Encrypt a message.
    ///
    /// With `iv` set the blocks are CBC-chained from it; without, each
    /// block is encrypted independently (ECB). With `padding` the
    /// message is right-padded PKCS5-style to the next 8-byte boundary
    /// (a whole extra block when already aligned); without, its length
    /// must already be a multiple of 8 or the call fails with
    /// [`Error::InvalidLength`].
    pub fn encrypt(&self, message: &[u8], iv: Option<Iv<'_>>, padding: bool) -> Result<Vec<u8>> {
        handle(message, &self.schedule, iv, padding, Direction::Encrypt)
    }

    /// Decrypt a message produced by [`encrypt`](Self::encrypt) with
    /// the same key, mode, and padding choice.
    ///
    /// With `padding` the final byte of the decrypted output is trusted
    /// as the pad length and that many trailing bytes are stripped; the
    /// pad bytes themselves are not verified, so corrupted ciphertext
    /// can silently yield truncated plaintext instead of an error.
    pub fn decrypt(&self, message: &[u8], iv: Option<Iv<'_>>, padding: bool) -> Result<Vec<u8>> {
        handle(message, &self.schedule, iv, padding, Direction::Decrypt)
    }
}

// Key material (even derived) stays out of debug output.
impl fmt::Debug for DesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesKey")
            .field("triple", &self.is_triple())
            .finish_non_exhaustive()
    }
}
