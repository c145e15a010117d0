pub mod batch;
pub mod error;
pub mod md5;

pub use error::{Md5Error, Result};
pub use md5::{finalize, init, md5_digest, update, Md5, MD5_BLOCK_SIZE, MD5_OUTPUT_SIZE};
