pub mod api;
pub mod app_state;
pub mod error;
pub mod logger;
pub mod routes;
pub mod service;


pub use api::{
    error::{ApiError, Result as ApiResult},
    update::{
        staging::{StagingFile, reboot_requested, staging_path, upload_basename},
        update_self::{UPDATE_APPLIED, UPDATE_IN_PROGRESS, UPLOAD_FIELD, update_self},
    },
    version::{VERSION, version},
};
pub use app_state::AppState;
pub use error::{Result as ServerResult, ServerError};
pub use service::{
    console::run_console,
    control_code::ControlCode,
    control_loop::{ControlLoop, LoopSettings},
    http_listener::HttpListener,
    install::{create_args, delete_args, install_service, remove_service},
    service_machine::{ServiceMachine, Transition},
    service_state::ServiceState,
    service_status::{Accepts, ServiceStatus},
    startup::apply_pending_update,
    tick_source::TickSource,
};

pub use crate::routes::build_router;
