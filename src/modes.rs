//! ECB and CBC drivers over 64-bit blocks, plus the message and
//! initial-value guards shared by the encrypt and decrypt entry points.

use log::trace;

use crate::error::{Error, Result};
use crate::feistel::Direction;
use crate::key::{encode, KeySchedule};

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 8;

/// An initial value for CBC mode.
///
/// Either 8 raw bytes, read big-endian, or a 64-bit integer. Passing
/// `None` to [`DesKey::encrypt`](crate::DesKey::encrypt) or
/// [`DesKey::decrypt`](crate::DesKey::decrypt) selects ECB instead.
#[derive(Debug, Clone, Copy)]
pub enum Iv<'a> {
    Bytes(&'a [u8]),
    Int(u64),
}

impl From<u64> for Iv<'static> {
    fn from(value: u64) -> Self {
        Iv::Int(value)
    }
}

impl<'a> From<&'a [u8]> for Iv<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Iv::Bytes(bytes)
    }
}

impl<'a> From<&'a [u8; BLOCK_SIZE]> for Iv<'a> {
    fn from(bytes: &'a [u8; BLOCK_SIZE]) -> Self {
        Iv::Bytes(bytes)
    }
}

/// Convert the caller's initial value to the internal 64-bit form.
/// Byte-form values must be exactly one block long.
fn guard_initial(iv: Option<Iv<'_>>) -> Result<Option<u64>> {
    match iv {
        None => Ok(None),
        Some(Iv::Int(value)) => Ok(Some(value)),
        Some(Iv::Bytes(bytes)) => {
            let block: [u8; BLOCK_SIZE] = bytes
                .try_into()
                .map_err(|_| Error::InvalidIv { length: bytes.len() })?;
            Ok(Some(u64::from_be_bytes(block)))
        }
    }
}

/// Right-pad PKCS5-style: `8 - (len % 8)` copies of that same count
/// byte, which is a whole extra block when the message is already
/// aligned.
fn pad(message: &[u8]) -> Vec<u8> {
    let fill = BLOCK_SIZE - (message.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(message.len() + fill);
    padded.extend_from_slice(message);
    padded.resize(message.len() + fill, fill as u8);
    padded
}

/// Strip PKCS5 padding after decryption. The final byte is trusted as
/// the pad length; the pad bytes themselves are not verified.
fn strip_padding(output: &mut Vec<u8>) {
    if let Some(&last) = output.last() {
        let n = usize::from(last).min(output.len());
        output.truncate(output.len() - n);
    }
}

/// ECB: every block transforms independently.
fn ecb<'a>(
    blocks: impl Iterator<Item = u64> + 'a,
    schedule: &'a KeySchedule,
    direction: Direction,
) -> impl Iterator<Item = u64> + 'a {
    blocks.map(move |block| encode(block, schedule, direction))
}

/// CBC: each block chains off the previous ciphertext block, seeded by
/// the initial value. Encryption is strictly sequential; decryption
/// only needs the previous ciphertext block, which is already in hand.
fn cbc<'a>(
    blocks: impl Iterator<Item = u64> + 'a,
    schedule: &'a KeySchedule,
    initial: u64,
    direction: Direction,
) -> impl Iterator<Item = u64> + 'a {
    let mut chain = initial;
    blocks.map(move |block| match direction {
        Direction::Encrypt => {
            chain = encode(block ^ chain, schedule, direction);
            chain
        }
        Direction::Decrypt => {
            let plain = encode(block, schedule, direction) ^ chain;
            chain = block;
            plain
        }
    })
}

/// Shared entry point behind `DesKey::encrypt` and `DesKey::decrypt`:
/// guard the inputs, split into big-endian 64-bit blocks, drive the
/// selected mode, and reassemble the bytes.
pub(crate) fn handle(
    message: &[u8],
    schedule: &KeySchedule,
    iv: Option<Iv<'_>>,
    padding: bool,
    direction: Direction,
) -> Result<Vec<u8>> {
    let initial = guard_initial(iv)?;

    let padded;
    let message: &[u8] = if padding && direction == Direction::Encrypt {
        padded = pad(message);
        &padded
    } else {
        if message.len() % BLOCK_SIZE != 0 {
            return Err(Error::InvalidLength {
                length: message.len(),
            });
        }
        if padding && message.is_empty() {
            // Nothing to strip a pad length from.
            return Err(Error::InvalidLength { length: 0 });
        }
        message
    };

    let blocks = message.chunks_exact(BLOCK_SIZE).map(|chunk| {
        chunk
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
    });

    let mut output = Vec::with_capacity(message.len());
    match initial {
        None => {
            trace!("ecb {:?}: {} block(s)", direction, message.len() / BLOCK_SIZE);
            for block in ecb(blocks, schedule, direction) {
                output.extend_from_slice(&block.to_be_bytes());
            }
        }
        Some(initial) => {
            trace!("cbc {:?}: {} block(s)", direction, message.len() / BLOCK_SIZE);
            for block in cbc(blocks, schedule, initial, direction) {
                output.extend_from_slice(&block.to_be_bytes());
            }
        }
    }

    if padding && direction == Direction::Decrypt {
        strip_padding(&mut output);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DesKey;

    fn single() -> DesKey {
        DesKey::new(&hex::decode("0123456789abcdef").unwrap()).unwrap()
    }

    fn triple() -> DesKey {
        DesKey::new(&hex::decode("0123456789abcdeffedcba9876543210").unwrap()).unwrap()
    }

    #[test]
    fn test_ecb_single_vector() {
        let key = single();
        let plain = b"hi another world";
        let cipher = hex::decode("2d3820d2963f9706ee8b812d03e3a91a").unwrap();
        assert_eq!(key.encrypt(plain, None, false).unwrap(), cipher);
        assert_eq!(key.decrypt(&cipher, None, false).unwrap(), plain);
    }

    #[test]
    fn test_ecb_triple_vector() {
        let key = triple();
        let plain = b"hi another world";
        let cipher = hex::decode("4938a7bd7e8599465fbef201d341cfa8").unwrap();
        assert_eq!(key.encrypt(plain, None, false).unwrap(), cipher);
        assert_eq!(key.decrypt(&cipher, None, false).unwrap(), plain);
    }

    #[test]
    fn test_cbc_single_vector() {
        let key = single();
        let plain = b"hi another world";
        let cipher = hex::decode("2d3820d2963f970621d36cb1e97bca5c").unwrap();
        assert_eq!(key.encrypt(plain, Some(Iv::Int(0)), false).unwrap(), cipher);
        assert_eq!(key.decrypt(&cipher, Some(Iv::Int(0)), false).unwrap(), plain);
    }

    #[test]
    fn test_cbc_triple_vector() {
        let key = triple();
        let plain = b"hi another world";
        let cipher = hex::decode("4938a7bd7e859946f2bae11bb8b65bc7").unwrap();
        assert_eq!(key.encrypt(plain, Some(Iv::Int(0)), false).unwrap(), cipher);
        assert_eq!(key.decrypt(&cipher, Some(Iv::Int(0)), false).unwrap(), plain);
    }

    #[test]
    fn test_pkcs5_single_vector() {
        let key = single();
        let plain = b"hello world";
        let cipher = hex::decode("1f797e16614dab0a6acd31ea6fbcdc6b").unwrap();
        assert_eq!(key.encrypt(plain, None, true).unwrap(), cipher);
        assert_eq!(key.decrypt(&cipher, None, true).unwrap(), plain);
    }

    // An aligned message still gains a whole pad block.
    #[test]
    fn test_pkcs5_aligned_vector() {
        let key = triple();
        let plain = b"hi another world";
        let cipher = hex::decode("4938a7bd7e8599465fbef201d341cfa82e24eeb85aef49ae").unwrap();
        assert_eq!(key.encrypt(plain, None, true).unwrap(), cipher);
        assert_eq!(key.decrypt(&cipher, None, true).unwrap(), plain);
    }

    #[test]
    fn test_empty_message_with_padding() {
        let key = single();
        let cipher = key.encrypt(b"", None, true).unwrap();
        assert_eq!(cipher.len(), BLOCK_SIZE);
        assert_eq!(key.decrypt(&cipher, None, true).unwrap(), b"");
    }

    #[test]
    fn test_unaligned_message_is_rejected() {
        let key = single();
        assert_eq!(
            key.encrypt(b"hello", None, false),
            Err(Error::InvalidLength { length: 5 })
        );
        assert_eq!(
            key.decrypt(b"hello", None, true),
            Err(Error::InvalidLength { length: 5 })
        );
        // Padding only applies on the encryption side.
        assert_eq!(
            key.decrypt(b"", None, true),
            Err(Error::InvalidLength { length: 0 })
        );
    }

    #[test]
    fn test_iv_forms_are_equivalent() {
        let key = single();
        let plain = b"hi another world";
        let from_int = key.encrypt(plain, Some(Iv::Int(0x0102030405060708)), false);
        let from_bytes = key
            .encrypt(plain, Some(Iv::from(&[1u8, 2, 3, 4, 5, 6, 7, 8])), false);
        assert_eq!(from_int, from_bytes);
    }

    #[test]
    fn test_iv_of_wrong_length_is_rejected() {
        let key = single();
        for n in [0, 7, 9, 16] {
            assert_eq!(
                key.encrypt(b"hi another world", Some(Iv::Bytes(&vec![0u8; n])), false),
                Err(Error::InvalidIv { length: n })
            );
        }
    }

    // ECB encrypts identical blocks identically; CBC does not.
    #[test]
    fn test_ecb_determinism_vs_cbc_chaining() {
        let key = single();
        let plain = [0x42u8; 16];

        let ecb = key.encrypt(&plain, None, false).unwrap();
        assert_eq!(ecb[..8], ecb[8..]);

        let cbc = key.encrypt(&plain, Some(Iv::Int(1)), false).unwrap();
        assert_ne!(cbc[..8], cbc[8..]);
    }

    #[test]
    fn test_cbc_iv_diffuses_every_block() {
        let key = single();
        let plain = [0x42u8; 24];
        let a = key.encrypt(&plain, Some(Iv::Int(0)), false).unwrap();
        let b = key.encrypt(&plain, Some(Iv::Int(1)), false).unwrap();
        for (block_a, block_b) in a.chunks(BLOCK_SIZE).zip(b.chunks(BLOCK_SIZE)) {
            assert_ne!(block_a, block_b);
        }
    }

    #[test]
    fn test_random_round_trips() {
        use rand::{Rng, RngCore, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);

        for _ in 0..50 {
            let mut key_bytes = vec![0u8; [8, 16, 24][rng.gen_range(0..3)]];
            rng.fill_bytes(&mut key_bytes);
            let key = DesKey::new(&key_bytes).unwrap();

            let mut plain = vec![0u8; rng.gen_range(0..64)];
            rng.fill_bytes(&mut plain);
            let iv = rng.gen::<u64>();

            let cipher = key.encrypt(&plain, Some(Iv::Int(iv)), true).unwrap();
            assert_eq!(key.decrypt(&cipher, Some(Iv::Int(iv)), true).unwrap(), plain);

            let cipher = key.encrypt(&plain, None, true).unwrap();
            assert_eq!(key.decrypt(&cipher, None, true).unwrap(), plain);
        }
    }

    #[test]
    fn test_padding_removal_trusts_final_byte() {
        let key = single();
        // A message whose last decrypted byte happens to be 3 loses
        // three bytes: the documented, unauthenticated behavior.
        let plain = b"hello\x01\x02\x03";
        let cipher = key.encrypt(plain, None, false).unwrap();
        assert_eq!(key.decrypt(&cipher, None, true).unwrap(), b"hello");
    }
}
