//! Domain types shared across the redactor.
//!
//! The domain layer provides the error hierarchy ([`RedactorError`]) and the
//! crate-wide [`Result`] alias. All fallible operations return
//! `Result<T, RedactorError>`:
//!
//! ```rust
//! use pii_redactor::domain::{RedactorError, Result};
//!
//! fn reject(bytes: &[u8]) -> Result<&str> {
//!     std::str::from_utf8(bytes)
//!         .map_err(|e| RedactorError::InvalidInput(format!("input is not UTF-8: {e}")))
//! }
//! # assert!(reject(&[0xff]).is_err());
//! ```

pub mod errors;
pub mod result;

pub use errors::RedactorError;
pub use result::Result;
