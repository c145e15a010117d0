//! The MD5 compression function and the little-endian packing it relies on.
//!
//! The 64 steps share one arithmetic pattern. Instead of spelling every step
//! out, a table built at compile time records, per step, which message word
//! is consumed, how far the sum is rotated and which additive constant is
//! used. The round index selects the mixing function.

use super::constants::{MD5_BLOCK_SIZE, MD5_OUTPUT_SIZE, ROTATIONS, T};

/// Parameters of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Index into the sixteen message words.
    pub word: usize,
    /// Left-rotation amount.
    pub shift: u32,
    /// Additive round constant.
    pub constant: u32,
}

/// The per-step schedule for all four rounds.
pub const SCHEDULE: [Step; 64] = build_schedule();

const fn build_schedule() -> [Step; 64] {
    let mut steps = [Step {
        word: 0,
        shift: 0,
        constant: 0,
    }; 64];
    let mut i = 0;
    while i < 64 {
        let round = i / 16;
        let word = match round {
            0 => i,
            1 => (5 * i + 1) % 16,
            2 => (3 * i + 5) % 16,
            _ => (7 * i) % 16,
        };
        steps[i] = Step {
            word,
            shift: ROTATIONS[round][i % 4],
            constant: T[i],
        };
        i += 1;
    }
    steps
}

#[inline(always)]
fn f(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | (!x & z)
}

#[inline(always)]
fn g(x: u32, y: u32, z: u32) -> u32 {
    (x & z) | (y & !z)
}

#[inline(always)]
fn h(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline(always)]
fn i(x: u32, y: u32, z: u32) -> u32 {
    y ^ (x | !z)
}

/// Runs the sixteen steps of one round with its mixing function.
///
/// Each step computes `a' = b + ((a + mix(b, c, d) + x[k] + T) <<< s)` and
/// then rotates the roles of the working variables.
#[inline(always)]
fn round<M>(v: &mut [u32; 4], block: &[u32; 16], steps: &[Step], mix: M)
where
    M: Fn(u32, u32, u32) -> u32,
{
    let [mut a, mut b, mut c, mut d] = *v;
    for s in steps {
        let mixed = a
            .wrapping_add(mix(b, c, d))
            .wrapping_add(block[s.word])
            .wrapping_add(s.constant)
            .rotate_left(s.shift)
            .wrapping_add(b);
        a = d;
        d = c;
        c = b;
        b = mixed;
    }
    *v = [a, b, c, d];
}

/// Compresses one 512-bit block into the running state.
///
/// Pure: returns the new (A, B, C, D) and leaves its inputs untouched.
pub fn transform(state: [u32; 4], block: &[u32; 16]) -> [u32; 4] {
    let mut v = state;
    round(&mut v, block, &SCHEDULE[0..16], f);
    round(&mut v, block, &SCHEDULE[16..32], g);
    round(&mut v, block, &SCHEDULE[32..48], h);
    round(&mut v, block, &SCHEDULE[48..64], i);
    let [a, b, c, d] = v;

    [
        state[0].wrapping_add(a),
        state[1].wrapping_add(b),
        state[2].wrapping_add(c),
        state[3].wrapping_add(d),
    ]
}

/// Loads sixteen words from a block, low-order byte first.
pub fn decode_block(bytes: &[u8; MD5_BLOCK_SIZE]) -> [u32; 16] {
    let mut words = [0u32; 16];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = (chunk[0] as u32)
            | ((chunk[1] as u32) << 8)
            | ((chunk[2] as u32) << 16)
            | ((chunk[3] as u32) << 24);
    }
    words
}

/// Writes the state words out as digest bytes, low-order byte first.
pub fn encode_state(state: &[u32; 4]) -> [u8; MD5_OUTPUT_SIZE] {
    let mut out = [0u8; MD5_OUTPUT_SIZE];
    for (chunk, &word) in out.chunks_exact_mut(4).zip(state.iter()) {
        chunk[0] = (word & 0xff) as u8;
        chunk[1] = ((word >> 8) & 0xff) as u8;
        chunk[2] = ((word >> 16) & 0xff) as u8;
        chunk[3] = ((word >> 24) & 0xff) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::md5::constants::INIT_STATE;

    #[test]
    fn test_schedule_word_order() {
        // Round 1 is sequential, the others follow RFC 1321's fixed permutations.
        let r1: Vec<usize> = SCHEDULE[0..16].iter().map(|s| s.word).collect();
        let r2: Vec<usize> = SCHEDULE[16..32].iter().map(|s| s.word).collect();
        let r3: Vec<usize> = SCHEDULE[32..48].iter().map(|s| s.word).collect();
        let r4: Vec<usize> = SCHEDULE[48..64].iter().map(|s| s.word).collect();
        assert_eq!(r1, (0..16).collect::<Vec<_>>());
        assert_eq!(r2, vec![1, 6, 11, 0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12]);
        assert_eq!(r3, vec![5, 8, 11, 14, 1, 4, 7, 10, 13, 0, 3, 6, 9, 12, 15, 2]);
        assert_eq!(r4, vec![0, 7, 14, 5, 12, 3, 10, 1, 8, 15, 6, 13, 4, 11, 2, 9]);
    }

    #[test]
    fn test_schedule_shifts_and_constants() {
        assert_eq!(SCHEDULE[0].shift, 7);
        assert_eq!(SCHEDULE[19].shift, 20);
        assert_eq!(SCHEDULE[34].shift, 16);
        assert_eq!(SCHEDULE[63].shift, 21);
        assert_eq!(SCHEDULE[0].constant, 0xd76aa478);
        assert_eq!(SCHEDULE[63].constant, 0xeb86d391);
    }

    #[test]
    fn test_constants_from_sine() {
        for (n, &t) in T.iter().enumerate() {
            let expected = (((n + 1) as f64).sin().abs() * 4294967296.0).floor() as u32;
            assert_eq!(t, expected, "constant {} mismatch", n);
        }
    }

    #[test]
    fn test_mixers() {
        // F selects y where x is set, z elsewhere
        assert_eq!(f(0xffff0000, 0x12345678, 0x9abcdef0), 0x1234def0);
        // G selects x where z is set, y elsewhere
        assert_eq!(g(0x12345678, 0x9abcdef0, 0x0000ffff), 0x9abc5678);
        assert_eq!(h(0x12345678, 0, 0xffffffff), 0xedcba987);
        assert_eq!(i(0, 0, 0), 0xffffffff);
    }

    #[test]
    fn test_transform_padded_empty_block() {
        // The single block hashed for the empty message.
        let mut block = [0u32; 16];
        block[0] = 0x80;
        let state = transform(INIT_STATE, &block);
        assert_eq!(
            encode_state(&state),
            [
                0xd4, 0x1d, 0x8c, 0xd9, 0x8f, 0x00, 0xb2, 0x04, 0xe9, 0x80, 0x09, 0x98, 0xec,
                0xf8, 0x42, 0x7e
            ]
        );
    }

    #[test]
    fn test_transform_is_pure() {
        let block = [0x01020304u32; 16];
        let first = transform(INIT_STATE, &block);
        let second = transform(INIT_STATE, &block);
        assert_eq!(first, second);
        assert_ne!(first, INIT_STATE);
    }

    #[test]
    fn test_packing_little_endian() {
        let mut bytes = [0u8; MD5_BLOCK_SIZE];
        bytes[0..4].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        bytes[60..64].copy_from_slice(&[0xaa, 0xbb, 0xcc, 0xdd]);
        let words = decode_block(&bytes);
        assert_eq!(words[0], 0x04030201);
        assert_eq!(words[15], 0xddccbbaa);

        let out = encode_state(&[0x04030201, 0, 0xddccbbaa, 0xffffffff]);
        assert_eq!(&out[0..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&out[8..12], &[0xaa, 0xbb, 0xcc, 0xdd]);
        assert_eq!(&out[12..16], &[0xff; 4]);
    }
}
