pub mod auth;

pub use auth::{auth_context_middleware, AuthUser};
