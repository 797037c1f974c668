//! Registration with the Windows service manager through `sc.exe`.

use crate::{ServerError, ServerResult};

use std::path::Path;

/// `sc.exe` arguments registering `exe` as an auto-start service
pub fn create_args(name: &str, exe: &Path) -> Vec<String> {
    vec![
        String::from("create"),
        name.to_owned(),
        String::from("binPath="),
        format!("\"{}\" run", exe.display()),
        String::from("start="),
        String::from("auto"),
        String::from("DisplayName="),
        name.to_owned(),
    ]
}

pub fn delete_args(name: &str) -> Vec<String> {
    vec![String::from("delete"), name.to_owned()]
}

pub fn install_service(name: &str) -> ServerResult<()> {
    let exe = std::env::current_exe()
        .map_err(|e| ServerError::io("Cannot locate running executable", e))?;
    run_sc(&create_args(name, &exe))
}

pub fn remove_service(name: &str) -> ServerResult<()> {
    run_sc(&delete_args(name))
}

#[cfg(windows)]
fn run_sc(args: &[String]) -> ServerResult<()> {
    let output = std::process::Command::new("sc.exe")
        .args(args)
        .output()
        .map_err(|e| ServerError::io("Failed to run sc.exe", e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ServerError::service(format!(
            "sc.exe {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stdout).trim()
        )))
    }
}

#[cfg(not(windows))]
fn run_sc(args: &[String]) -> ServerResult<()> {
    Err(ServerError::service(format!(
        "sc.exe {} needs Windows; run `su-service run` under your init system instead",
        args.first().map(String::as_str).unwrap_or_default()
    )))
}
