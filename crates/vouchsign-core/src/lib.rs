//! # vouchsign-core
//!
//! Configuration types shared by the vouchsign crates.
//!
//! The issuing backend and every verifying party (point-of-sale scanners,
//! partner apps) agree on a [`JwtConfig`] upfront. The other types describe
//! where key material lives and which TTL each kind of token gets.

pub mod algorithm;
pub mod config;

pub use algorithm::{Algorithm, Curve};
pub use config::{ConfigError, JwtConfig, KeyConfig, TtlConfig, VouchsignConfig};
