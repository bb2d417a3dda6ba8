pub mod paths;
pub mod token_store;

pub use paths::ConsolePaths;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
