pub mod error;
pub mod update;
pub mod version;
