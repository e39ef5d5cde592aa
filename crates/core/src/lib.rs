// Core types for the Tollgate authenticated tool gateway

pub mod auth;
pub mod schema;
pub mod types;

pub use auth::{CredentialError, CredentialStore, TokenAuthenticator};
pub use schema::{FieldKind, FieldSpec, InputSchema, ValidatedInput, ValidationError};
pub use types::*;
