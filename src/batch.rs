//! Hashing many independent messages at once.
//!
//! Every message gets its own context, so no state is shared. With the
//! `parallel` feature the work is spread over rayon's thread pool; the output
//! order always matches the input order.

use crate::md5::{md5_digest, MD5_OUTPUT_SIZE};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Returns the digest of each message, in input order.
#[cfg(feature = "parallel")]
pub fn digest_all(messages: &[&[u8]]) -> Vec<[u8; MD5_OUTPUT_SIZE]> {
    log::debug!("hashing {} messages in parallel", messages.len());
    messages.par_iter().map(|m| md5_digest(m)).collect()
}

/// Returns the digest of each message, in input order.
#[cfg(not(feature = "parallel"))]
pub fn digest_all(messages: &[&[u8]]) -> Vec<[u8; MD5_OUTPUT_SIZE]> {
    log::debug!("hashing {} messages", messages.len());
    messages.iter().map(|m| md5_digest(m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_all_preserves_order() {
        let messages: [&[u8]; 3] = [b"", b"abc", b"message digest"];
        let digests = digest_all(&messages);
        let hex: Vec<String> = digests.iter().map(hex::encode).collect();
        assert_eq!(
            hex,
            vec![
                "d41d8cd98f00b204e9800998ecf8427e",
                "900150983cd24fb0d6963f7d28e17f72",
                "f96b697d7cb7938d525a2f31aaf161d0",
            ]
        );
    }

    #[test]
    fn test_digest_all_empty_batch() {
        assert!(digest_all(&[]).is_empty());
    }

    #[test]
    fn test_digest_all_matches_single() {
        let data: Vec<Vec<u8>> = (0..50u8).map(|n| vec![n; n as usize * 7]).collect();
        let refs: Vec<&[u8]> = data.iter().map(|v| v.as_slice()).collect();
        let batch = digest_all(&refs);
        for (msg, digest) in refs.iter().zip(batch.iter()) {
            assert_eq!(*digest, md5_digest(msg));
        }
    }
}
