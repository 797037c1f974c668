use crate::api::update::staging::{StagingFile, reboot_requested, staging_path, upload_basename};
use crate::{ApiError, ApiResult, AppState};

use su_core::UpdatePermit;

use std::path::PathBuf;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};

/// Multipart field carrying the new executable
pub const UPLOAD_FIELD: &str = "uploadfile";
pub const UPDATE_APPLIED: &str = "Self update applied after reboot.";
pub const UPDATE_IN_PROGRESS: &str = "Update in progress";

/// An upload written to its staging path, still holding the update guard.
struct StagedUpdate {
    original: PathBuf,
    staged: PathBuf,
    permit: UpdatePermit,
}

/// POST /api/v1/update/self
///
/// Stages the uploaded binary next to the running executable, then
/// schedules the deferred swap (and the restart unless `reboot=false`) in
/// the background. The guard stays held until that work is done.
pub async fn update_self(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<&'static str> {
    let reboot = reboot_requested(&query);

    let update = receive_update(&state, multipart)
        .await
        .inspect_err(|e| e.log_to(&state.log))?;

    state.log.info(format!(
        "{} --> {}",
        update.original.display(),
        update.staged.display()
    ));

    schedule_in_background(state, update, reboot);

    Ok(UPDATE_APPLIED)
}

async fn receive_update(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<StagedUpdate> {
    let permit = state
        .update_guard
        .try_acquire()
        .ok_or_else(|| ApiError::conflict(UPDATE_IN_PROGRESS))?;

    let mut multipart = multipart?;

    let original = state.executable_path().map_err(|e| {
        ApiError::internal(format!("Cannot resolve own executable path: {e}"))
    })?;
    let exe_dir = original.parent().ok_or_else(|| {
        ApiError::internal(format!("{} has no parent directory", original.display()))
    })?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let basename = upload_basename(field.file_name())
            .ok_or_else(|| ApiError::bad_request("Uploaded file has no usable file name"))?
            .to_owned();
        let staged = staging_path(exe_dir, &basename);
        if staged == original {
            return Err(ApiError::bad_request(format!(
                "Uploaded file name {basename} would stage over the running executable"
            )));
        }

        let mut staging = StagingFile::create(&staged).await?;
        let written = staging.write_field(&mut field).await?;
        staging.copy_permissions_from(&original).await?;
        state.log.debug(format!(
            "Staged {written} bytes at {}",
            staging.path().display()
        ));
        let staged = staging.commit();

        return Ok(StagedUpdate {
            original,
            staged,
            permit,
        });
    }

    Err(ApiError::internal(format!(
        "Multipart field '{UPLOAD_FIELD}' not found"
    )))
}

/// Deferred replacement and restart run on the blocking pool; they call
/// into the OS and never report back to the client.
fn schedule_in_background(state: AppState, update: StagedUpdate, reboot: bool) {
    tokio::task::spawn_blocking(move || {
        let StagedUpdate {
            original,
            staged,
            permit,
        } = update;

        if let Err(e) = state.replacer.schedule(&original, &staged) {
            state.log.error(format!("Deferred replacement incomplete: {e}"));
        }

        if reboot {
            state.log.info("Rebooting system...");
            if let Err(e) = state.restart.request_restart() {
                state.log.error(e);
            }
        }

        drop(permit);
    });
}
