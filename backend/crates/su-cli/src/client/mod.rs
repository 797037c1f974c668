pub(crate) mod client;
pub(crate) mod error;

pub use client::{Client, ServerResponse};
pub use error::{ClientError, Result as CliClientResult};
