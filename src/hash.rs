//! Salted 64-bit hash functions used to derive permutations and key slots.
//!
//! Every value the table depends on comes from a [`HashFunction`]: a node's offset and skip are
//! hashed with [`OFFSET_SALT`] and [`SKIP_SALT`] respectively, and keys are hashed with
//! [`OFFSET_SALT`] to pick their slot. Implementations must be deterministic for a given salt,
//! and should spread their output evenly over the `u64` space.

use crc::{Algorithm, Crc};

/// Salt used to derive each node's starting offset, and to map keys onto slots.
pub const OFFSET_SALT: u64 = 0xabca_aefe;

/// Salt used to derive each node's skip.
pub const SKIP_SALT: u64 = 0xa012_9efe;

/// A salted hash over arbitrary bytes.
///
/// Any `Fn(&[u8], u64) -> u64` closure is a [`HashFunction`], which makes it straightforward to
/// plug in a stub for tests:
///
/// ```
/// use maglev::Maglev;
///
/// let table = Maglev::with_hasher(vec!["a", "b"], 7, |input: &[u8], salt: u64| {
///     input.len() as u64 ^ salt
/// });
/// assert_eq!(table.len(), 2);
/// ```
pub trait HashFunction: Send + Sync {
    /// Hashes `input` under the given `salt`.
    fn hash(&self, input: &[u8], salt: u64) -> u64;
}

impl<F> HashFunction for F
where
    F: Fn(&[u8], u64) -> u64 + Send + Sync,
{
    fn hash(&self, input: &[u8], salt: u64) -> u64 {
        self(input, salt)
    }
}

// The salt is the reflected generating polynomial; the crc crate wants it in normal form.
const OFFSET_ALGORITHM: Algorithm<u64> = Algorithm {
    width: 64,
    poly: OFFSET_SALT.reverse_bits(),
    init: u64::MAX,
    refin: true,
    refout: true,
    xorout: u64::MAX,
    check: 0xffff_ffff_c6d4_2d51,
    residue: 0x5b79_364e,
};

const SKIP_ALGORITHM: Algorithm<u64> = Algorithm {
    width: 64,
    poly: SKIP_SALT.reverse_bits(),
    init: u64::MAX,
    refin: true,
    refout: true,
    xorout: u64::MAX,
    check: 0xffff_ffff_0853_d4e9,
    residue: 0x9ceb_c564,
};

const OFFSET_CRC: Crc<u64> = Crc::<u64>::new(&OFFSET_ALGORITHM);
const SKIP_CRC: Crc<u64> = Crc::<u64>::new(&SKIP_ALGORITHM);

/// CRC-64 checksum using the salt as its generating polynomial.
///
/// This is the default hash function. The checksum is the reflected form (least significant bit
/// first), with an all-ones initial value and final xor, where the salt is taken as the
/// polynomial in reflected bit order.
///
/// The two salts used internally are served from precomputed tables. Any other salt falls back to
/// a bit-at-a-time computation which yields identical results, only slower.
#[derive(Clone, Copy, Debug, Default)]
pub struct Crc64;

impl HashFunction for Crc64 {
    fn hash(&self, input: &[u8], salt: u64) -> u64 {
        match salt {
            OFFSET_SALT => OFFSET_CRC.checksum(input),
            SKIP_SALT => SKIP_CRC.checksum(input),
            poly => crc64_bitwise(input, poly),
        }
    }
}

fn crc64_bitwise(input: &[u8], poly: u64) -> u64 {
    let mut crc = u64::MAX;
    for &byte in input {
        crc ^= u64::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ poly
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// BLAKE3 keyed by salt: the first eight bytes of `blake3(salt ++ input)`, little-endian.
///
/// Slower than [`Crc64`], but with a much stronger spread for adversarial or highly regular
/// node identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3;

impl HashFunction for Blake3 {
    fn hash(&self, input: &[u8], salt: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&salt.to_le_bytes());
        hasher.update(input);

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hasher.finalize().as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }
}
