pub mod accounts;
pub mod password;
pub mod tokens;

pub use accounts::AccountRepository;
pub use tokens::{Claims, TokenError, TokenSigner};
