//! Windows service manager bridge.
//!
//! `StartServiceCtrlDispatcherW` blocks its thread and calls back into
//! `service_main` on a thread of its own, so the launch data sits in a
//! process-wide cell and the control loop is driven with the runtime handle
//! captured before dispatching.

use crate::{ControlCode, ControlLoop, ServerError, ServerResult, ServiceState, ServiceStatus};

use su_core::ServiceLogger;

use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;
use std::sync::{Mutex, OnceLock};

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use windows_sys::Win32::Foundation::{ERROR_CALL_NOT_IMPLEMENTED, NO_ERROR};
use windows_sys::Win32::System::Services::{
    RegisterServiceCtrlHandlerExW, SERVICE_STATUS, SERVICE_STATUS_HANDLE, SERVICE_TABLE_ENTRYW,
    SERVICE_WIN32_OWN_PROCESS, SetServiceStatus, StartServiceCtrlDispatcherW,
};
use windows_sys::core::PWSTR;

const PENDING_WAIT_HINT_MS: u32 = 3_000;

struct Launch {
    runtime: Handle,
    name: Vec<u16>,
    control_loop: Mutex<Option<ControlLoop>>,
    result: Mutex<Option<ServerResult<()>>>,
    log: ServiceLogger,
}

static LAUNCH: OnceLock<Launch> = OnceLock::new();

/// Hand the process to the service manager until the service stops.
pub async fn run_dispatcher(
    name: &str,
    control_loop: ControlLoop,
    log: ServiceLogger,
) -> ServerResult<()> {
    let launch = Launch {
        runtime: Handle::current(),
        name: std::ffi::OsStr::new(name)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect(),
        control_loop: Mutex::new(Some(control_loop)),
        result: Mutex::new(None),
        log,
    };
    if LAUNCH.set(launch).is_err() {
        return Err(ServerError::service("Service dispatcher already started"));
    }

    tokio::task::spawn_blocking(dispatch)
        .await
        .map_err(|e| ServerError::service(format!("Dispatcher thread failed: {e}")))??;

    let Some(launch) = LAUNCH.get() else {
        return Ok(());
    };
    let result = launch
        .result
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    result.unwrap_or_else(|| Err(ServerError::service("Service main never ran")))
}

fn dispatch() -> ServerResult<()> {
    let Some(launch) = LAUNCH.get() else {
        return Err(ServerError::service("Service launch data missing"));
    };

    let mut name = launch.name.clone();
    let table = [
        SERVICE_TABLE_ENTRYW {
            lpServiceName: name.as_mut_ptr(),
            lpServiceProc: Some(service_main),
        },
        SERVICE_TABLE_ENTRYW {
            lpServiceName: std::ptr::null_mut(),
            lpServiceProc: None,
        },
    ];

    // SAFETY: the table is terminated by a null entry and, with the name
    // buffer, outlives the call, which returns only after the service stopped.
    let ok = unsafe { StartServiceCtrlDispatcherW(table.as_ptr()) };
    if ok == 0 {
        return Err(ServerError::io(
            "StartServiceCtrlDispatcherW failed (not started by the service manager?)",
            std::io::Error::last_os_error(),
        ));
    }

    Ok(())
}

unsafe extern "system" fn service_main(_argc: u32, _argv: *mut PWSTR) {
    let Some(launch) = LAUNCH.get() else {
        return;
    };
    let log = &launch.log;

    let (requests_tx, requests_rx) = mpsc::channel::<ControlCode>(8);
    // Never freed: the handler may be called until the process exits.
    let context = Box::into_raw(Box::new(requests_tx));

    // SAFETY: the name is NUL-terminated UTF-16 in a static; the context
    // pointer stays valid for the rest of the process.
    let handle = unsafe {
        RegisterServiceCtrlHandlerExW(
            launch.name.as_ptr(),
            Some(control_handler),
            context as *const c_void,
        )
    };
    if handle as usize == 0 {
        log.error(format!(
            "RegisterServiceCtrlHandlerExW failed: {}",
            std::io::Error::last_os_error()
        ));
        return;
    }
    let status_handle = handle as usize;

    let taken = launch
        .control_loop
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    let Some(control_loop) = taken else {
        log.error("Control loop already consumed");
        return;
    };

    let (changes_tx, mut changes_rx) = mpsc::unbounded_channel::<ServiceStatus>();
    let result = launch.runtime.block_on(async {
        let reporter = async {
            while let Some(status) = changes_rx.recv().await {
                set_status(status_handle, status, log);
            }
        };
        let (result, ()) = tokio::join!(control_loop.run(requests_rx, changes_tx), reporter);
        result
    });

    if let Err(e) = &result {
        log.error(format!("Service stopped with error: {e}"));
    }
    *launch
        .result
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(result);

    // Last report: the dispatcher returns once the service is Stopped
    set_status(
        status_handle,
        ServiceStatus::new(ServiceState::Stopped),
        log,
    );
}

unsafe extern "system" fn control_handler(
    control: u32,
    _event_type: u32,
    _event_data: *mut c_void,
    context: *mut c_void,
) -> u32 {
    // SAFETY: context is the sender leaked in service_main
    let requests = unsafe { &*(context as *const mpsc::Sender<ControlCode>) };

    // Unknown codes are forwarded too, the loop logs them
    let code = ControlCode::from_raw(control);
    let _ = requests.try_send(code);
    if code.is_handled() {
        NO_ERROR
    } else {
        ERROR_CALL_NOT_IMPLEMENTED
    }
}

fn set_status(handle: usize, status: ServiceStatus, log: &ServiceLogger) {
    let raw = SERVICE_STATUS {
        dwServiceType: SERVICE_WIN32_OWN_PROCESS,
        dwCurrentState: status.state.scm_code(),
        dwControlsAccepted: status.accepts.bits(),
        dwWin32ExitCode: NO_ERROR,
        dwServiceSpecificExitCode: 0,
        dwCheckPoint: 0,
        dwWaitHint: if status.state.is_pending() {
            PENDING_WAIT_HINT_MS
        } else {
            0
        },
    };

    // SAFETY: the handle came from RegisterServiceCtrlHandlerExW and is never closed
    let ok = unsafe { SetServiceStatus(handle as SERVICE_STATUS_HANDLE, &raw) };
    if ok == 0 {
        log.error(format!(
            "SetServiceStatus({}) failed: {}",
            status.state,
            std::io::Error::last_os_error()
        ));
    } else {
        log.info(format!("Service status: {status}"));
    }
}
