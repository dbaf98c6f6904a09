//! Security models
//!
//! - `secret`: Secret management and zeroization

mod secret;

pub use secret::SecretString;
