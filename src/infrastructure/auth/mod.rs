//! Authentication infrastructure module
//!
//! This module provides JWT bearer token validation and logout revocation.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
