//! Streaming MD5 (RFC 1321) message digest.
//!
//! MD5 is collision-broken. This engine reproduces its exact bit behavior
//! for interoperability (checksums, legacy handshakes); it makes no claim of
//! cryptographic strength.
//!
//! A context is created with [`Md5::new`] (or [`init`]), fed any number of
//! byte slices with [`Md5::update`], and closed with [`Md5::finalize`], which
//! yields the 16-byte digest.

mod constants;
mod transform;


use std::io::{self, Read};

use log::{debug, trace, warn};

use crate::error::{Md5Error, Result};

pub use constants::{MD5_BLOCK_SIZE, MD5_OUTPUT_SIZE};
pub use transform::transform;

use constants::{INIT_STATE, LENGTH_OFFSET, PADDING};
use transform::{decode_block, encode_state};

/// An MD5 computation in progress.
#[derive(Debug, Clone)]
pub struct Md5 {
    /// State (A, B, C, D).
    state: [u32; 4],
    /// Total message length in bits, mod 2^64.
    bit_length: u64,
    /// Unprocessed tail of the input.
    buffer: [u8; MD5_BLOCK_SIZE],
    /// Output area, written by finalize.
    digest: [u8; MD5_OUTPUT_SIZE],
    finalized: bool,
    /// Compression calls since the last reset.
    blocks: u64,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    /// Creates a context holding the algorithm's initial condition.
    pub fn new() -> Self {
        Self {
            state: INIT_STATE,
            bit_length: 0,
            buffer: [0u8; MD5_BLOCK_SIZE],
            digest: [0u8; MD5_OUTPUT_SIZE],
            finalized: false,
            blocks: 0,
        }
    }

    /// Restores the initial condition so the context can hash a new message.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Appends `data` to the message.
    ///
    /// A finalized context ignores the bytes and keeps its stored digest;
    /// call [`Md5::reset`] first to hash a new message, or use
    /// [`Md5::try_update`] to have the call rejected.
    pub fn update(&mut self, data: &[u8]) {
        if self.finalized {
            warn!(
                "MD5 update of {} bytes ignored: context already finalized, stored digest kept",
                data.len()
            );
            return;
        }
        self.absorb(data);
    }

    /// Like [`Md5::update`], but refuses a finalized context.
    pub fn try_update(&mut self, data: &[u8]) -> Result<()> {
        if self.finalized {
            return Err(Md5Error::Finalized);
        }
        self.absorb(data);
        Ok(())
    }

    /// Pads the message, runs the last compression and returns the digest.
    ///
    /// The digest is kept in the context. A repeated call returns it again
    /// without touching the state.
    pub fn finalize(&mut self) -> [u8; MD5_OUTPUT_SIZE] {
        if self.finalized {
            debug!("MD5 context already finalized, returning stored digest");
            return self.digest;
        }

        // captured before padding moves the counter
        let bits = self.bit_length;
        let mdi = self.buffered_len();
        let pad_len = if mdi < LENGTH_OFFSET {
            LENGTH_OFFSET - mdi
        } else {
            MD5_BLOCK_SIZE + LENGTH_OFFSET - mdi
        };
        debug!(
            "MD5 finalize: {} message bits, {} buffered bytes, {} padding bytes",
            bits, mdi, pad_len
        );
        self.absorb(&PADDING[..pad_len]);

        let mut block = decode_block(&self.buffer);
        block[14] = (bits & 0xffff_ffff) as u32;
        block[15] = (bits >> 32) as u32;
        self.compress(&block);

        self.digest = encode_state(&self.state);
        self.finalized = true;
        debug!("MD5 finalized after {} blocks", self.blocks);
        self.digest
    }

    /// Like [`Md5::finalize`], but a second call is an error.
    pub fn try_finalize(&mut self) -> Result<[u8; MD5_OUTPUT_SIZE]> {
        if self.finalized {
            return Err(Md5Error::Finalized);
        }
        Ok(self.finalize())
    }

    /// The digest, once [`Md5::finalize`] has run.
    pub fn digest(&self) -> Option<[u8; MD5_OUTPUT_SIZE]> {
        self.finalized.then_some(self.digest)
    }

    /// Whether the digest has been produced.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Total number of bits absorbed, mod 2^64.
    pub fn bit_length(&self) -> u64 {
        self.bit_length
    }

    /// Bytes waiting in the block buffer.
    pub fn buffered_len(&self) -> usize {
        ((self.bit_length >> 3) & 0x3f) as usize
    }

    /// Compression function invocations since the last reset.
    pub fn blocks_compressed(&self) -> u64 {
        self.blocks
    }

    /// Hashes `data` in one shot.
    pub fn digest_bytes(data: &[u8]) -> [u8; MD5_OUTPUT_SIZE] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Hashes everything `reader` yields until EOF.
    pub fn digest_reader<R: Read>(reader: &mut R) -> Result<[u8; MD5_OUTPUT_SIZE]> {
        let mut hasher = Self::new();
        let mut chunk = [0u8; 4 * MD5_BLOCK_SIZE];
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Md5Error::from(e)),
            };
            hasher.update(&chunk[..n]);
        }
        Ok(hasher.finalize())
    }

    fn absorb(&mut self, mut data: &[u8]) {
        let mut mdi = self.buffered_len();
        self.bit_length = self
            .bit_length
            .wrapping_add((data.len() as u64).wrapping_mul(8));

        // top up a partially filled buffer first
        if mdi > 0 {
            let take = data.len().min(MD5_BLOCK_SIZE - mdi);
            self.buffer[mdi..mdi + take].copy_from_slice(&data[..take]);
            mdi += take;
            data = &data[take..];
            if mdi < MD5_BLOCK_SIZE {
                return;
            }
            let block = decode_block(&self.buffer);
            self.compress(&block);
        }

        let mut blocks = data.chunks_exact(MD5_BLOCK_SIZE);
        for chunk in &mut blocks {
            let mut bytes = [0u8; MD5_BLOCK_SIZE];
            bytes.copy_from_slice(chunk);
            self.compress(&decode_block(&bytes));
        }
        let tail = blocks.remainder();
        self.buffer[..tail.len()].copy_from_slice(tail);
    }

    fn compress(&mut self, block: &[u32; 16]) {
        self.state = transform(self.state, block);
        self.blocks += 1;
        trace!("MD5 block {} compressed", self.blocks);
    }
}

impl io::Write for Md5 {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Creates a fresh context.
pub fn init() -> Md5 {
    Md5::new()
}

/// Appends `data` to the message held by `ctx`.
pub fn update(ctx: &mut Md5, data: &[u8]) {
    ctx.update(data);
}

/// Closes the message held by `ctx` and returns its digest.
pub fn finalize(ctx: &mut Md5) -> [u8; MD5_OUTPUT_SIZE] {
    ctx.finalize()
}

/// Convenience function to compute an MD5 digest in a single shot.
pub fn md5_digest(data: &[u8]) -> [u8; MD5_OUTPUT_SIZE] {
    Md5::digest_bytes(data)
}
