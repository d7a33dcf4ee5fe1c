//! DES and Triple-DES (EDE) block-cipher engine in pure Rust, with ECB
//! and CBC modes and optional PKCS5 padding.
//!
//! DISCLAIMER: DES is a legacy cipher with a 56-bit effective key and is
//! broken against brute force; this crate exists for interoperability
//! with systems that still speak it and for educational purposes. Do NOT
//! reach for it to protect new data. If you need a block cipher for real
//! cryptographic operations, please use a vetted, well-reviewed modern
//! cipher and library.
//!
//! Keys of 8 bytes select single DES; 16 or 24 bytes select Triple-DES
//! (encrypt-decrypt-encrypt), with degenerate sub-key combinations
//! collapsing back to single DES so that equivalent keys produce
//! identical output. Supplying an initial value selects CBC; omitting
//! it selects ECB.
//!
//! ```
//! use deskey::{DesKey, Iv};
//!
//! let key = DesKey::new(&[0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef])?;
//! let cipher = key.encrypt(b"hi another world", Some(Iv::Int(0)), false)?;
//! assert_eq!(key.decrypt(&cipher, Some(Iv::Int(0)), false)?, b"hi another world");
//! # Ok::<(), deskey::Error>(())
//! ```

pub mod error;
mod feistel;
mod key;
mod modes;
mod schedule;

pub use error::{Error, Result};
pub use key::DesKey;
pub use modes::{Iv, BLOCK_SIZE};
