//! `stockledger-auth` — authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: claims are a
//! transport-agnostic model, validation is deterministic, and the only IO-free
//! exception is signature verification behind the [`JwtValidator`] trait.

pub mod claims;
pub mod jwt;
pub mod roles;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use roles::Role;
