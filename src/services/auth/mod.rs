pub mod factory;
pub mod jwks;
pub mod resolver;
pub mod service;
pub mod verifier;

pub use factory::build_auth_service;
pub use resolver::{IdentityResolver, ProfileSyncPolicy};
pub use service::{AuthError, AuthService};
pub use verifier::{AuthFailure, TokenVerifier};
