//! The DES key schedule: derives the 16 round subkeys from an 8-byte key.
//!
//! The permutation tables below are the canonical FIPS 46-3 tables,
//! written exactly as they appear in the standard: entries are 1-based
//! bit positions counted from the most significant bit of the input.

/// Number of Feistel rounds, and therefore of round subkeys per key.
pub(crate) const ROUNDS: usize = 16;

/// The 16 round subkeys derived from one 8-byte key, in encryption
/// order. Each subkey occupies the low 48 bits of its `u64`.
pub(crate) type RoundKeys = [u64; ROUNDS];

/// Permuted choice 1: selects 56 of the 64 key bits (dropping the 8
/// parity bits) and splits them into the C and D registers.
#[rustfmt::skip]
const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,
     1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27,
    19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,
     7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29,
    21, 13,  5, 28, 20, 12,  4,
];

/// Permuted choice 2: selects the 48 subkey bits from the rotated
/// 56-bit C‖D state.
#[rustfmt::skip]
const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,
     3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8,
    16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55,
    30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53,
    46, 42, 50, 36, 29, 32,
];

/// Left-rotation amount applied to both 28-bit registers before each
/// round's subkey is extracted: 1 bit for rounds 1, 2, 9, and 16, 2 bits
/// otherwise. The rotations total 28, so both registers return to their
/// initial position after the last round.
const ROTATIONS: [u8; ROUNDS] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

/// Extract `table.len()` bits from `value`, a `width`-bit quantity, MSB
/// first. `table` holds 1-based source bit positions counted from the
/// MSB, so the standard's tables can be transcribed verbatim.
pub(crate) fn permute(value: u64, width: u32, table: &[u8]) -> u64 {
    let mut out = 0;
    for &pos in table {
        out = (out << 1) | ((value >> (width - u32::from(pos))) & 1);
    }
    out
}

/// Rotate a 28-bit register left by `n` bits.
fn rotate_half(half: u64, n: u8) -> u64 {
    ((half << n) | (half >> (28 - n))) & 0x0FFF_FFFF
}

/// Derive the 16 round subkeys for one 8-byte key, in encryption order.
///
/// Callers hand in exactly 8 bytes; the Feistel rounds consume the
/// result forwards when encrypting and backwards when decrypting.
pub(crate) fn derive_keys(key: &[u8]) -> RoundKeys {
    debug_assert_eq!(key.len(), 8);

    let material = key.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let state = permute(material, 64, &PC1);
    let mut c = state >> 28;
    let mut d = state & 0x0FFF_FFFF;

    let mut keys = [0u64; ROUNDS];
    for (subkey, &n) in keys.iter_mut().zip(ROTATIONS.iter()) {
        c = rotate_half(c, n);
        d = rotate_half(d, n);
        *subkey = permute((c << 28) | d, 56, &PC2);
    }
    keys
}
