pub mod config;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod types;

pub use config::Config;
pub use error::FundScoutError;
pub use identity::identity_key;
pub use types::*;
