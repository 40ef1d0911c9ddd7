pub mod claims;
pub mod codec;

pub use claims::{AccountInfo, AccountType, TokenClaims};
pub use codec::TokenCodec;
