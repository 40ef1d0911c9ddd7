pub mod engine;
pub mod identity;

pub use engine::{AccessInfo, TokenEngine};
pub use identity::{IdentityQuery, LivenessPolicy};
