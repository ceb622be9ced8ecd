pub mod details;
pub mod enrich;
pub mod filter;
pub mod notify;
pub mod report;
pub mod scout;
pub mod sources;
pub mod structural;
pub mod textmine;
pub mod traits;
pub mod urlclean;
