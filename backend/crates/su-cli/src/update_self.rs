use crate::{CliClientResult, Client, ClientError, ServerResponse};

use std::path::PathBuf;

pub const NO_FILE: &str = "No file provided. See --file flag for more info.";
pub const NO_HOST: &str = "No host/ip provided. See --host flag for more info.";

/// Validated arguments of `su update self`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSelfRequest {
    pub file: PathBuf,
    pub host: String,
    pub port: u16,
    pub reboot: bool,
}

impl UpdateSelfRequest {
    /// File is checked first, then host.
    pub fn from_args(
        file: Option<&str>,
        host: &str,
        port: u16,
        reboot: bool,
    ) -> CliClientResult<Self> {
        let file = match file {
            Some(file) if !file.trim().is_empty() => PathBuf::from(file),
            _ => return Err(ClientError::validation(NO_FILE)),
        };
        let host = validate_host(host)?;

        Ok(Self {
            file,
            host,
            port,
            reboot,
        })
    }
}

fn validate_host(host: &str) -> CliClientResult<String> {
    let host = host.trim();
    if host.is_empty() {
        Err(ClientError::validation(NO_HOST))
    } else {
        Ok(host.to_string())
    }
}

/// `su update self`: validate, then upload once.
pub async fn run_update_self(
    file: Option<&str>,
    host: &str,
    port: u16,
    reboot: bool,
) -> CliClientResult<ServerResponse> {
    let request = UpdateSelfRequest::from_args(file, host, port, reboot)?;

    Client::new(&request.host, request.port)
        .update_self(&request.file, request.reboot)
        .await
}

/// `su version`
pub async fn run_version(host: &str, port: u16) -> CliClientResult<ServerResponse> {
    let host = validate_host(host)?;
    Client::new(&host, port).version().await
}
