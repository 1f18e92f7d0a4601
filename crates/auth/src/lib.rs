//! `catalog-auth`: authentication and authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: it knows how to verify a
//! bearer token into a [`Principal`] and how to answer "does this principal
//! hold that permission".

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;

pub use authorize::{authorize, AuthzError};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use principal::Principal;
