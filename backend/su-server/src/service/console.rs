use crate::{ControlCode, ControlLoop, ServerResult, ServiceState, ServiceStatus};

use su_core::ServiceLogger;

use tokio::sync::mpsc;

/// Run the control loop without a service manager.
///
/// Ctrl+C stops the service. On Unix, SIGTERM is Shutdown, SIGUSR1 Pause,
/// SIGUSR2 Continue and SIGHUP Interrogate.
pub async fn run_console(control_loop: ControlLoop, log: ServiceLogger) -> ServerResult<()> {
    let (requests_tx, requests_rx) = mpsc::channel(8);
    let (changes_tx, mut changes_rx) = mpsc::unbounded_channel::<ServiceStatus>();

    let status_log = log.clone();
    let reporter = tokio::spawn(async move {
        while let Some(status) = changes_rx.recv().await {
            status_log.info(format!("Service status: {status}"));
        }
    });
    let signals = tokio::spawn(forward_signals(requests_tx, log.clone()));

    let result = control_loop.run(requests_rx, changes_tx).await;

    signals.abort();
    let _ = reporter.await;
    log.info(format!(
        "Service status: {}",
        ServiceStatus::new(ServiceState::Stopped)
    ));

    result
}

#[cfg(unix)]
async fn forward_signals(requests: mpsc::Sender<ControlCode>, log: ServiceLogger) {
    use tokio::signal::unix::{SignalKind, signal};

    let handlers = (
        signal(SignalKind::terminate()),
        signal(SignalKind::user_defined1()),
        signal(SignalKind::user_defined2()),
        signal(SignalKind::hangup()),
    );
    let (mut term, mut usr1, mut usr2, mut hup) = match handlers {
        (Ok(term), Ok(usr1), Ok(usr2), Ok(hup)) => (term, usr1, usr2, hup),
        _ => {
            log.error("Failed to install signal handlers");
            return;
        }
    };

    loop {
        let code = tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => ControlCode::Stop,
                Err(e) => {
                    log.error(format!("Failed to listen for Ctrl+C: {e}"));
                    return;
                }
            },
            _ = term.recv() => ControlCode::Shutdown,
            _ = usr1.recv() => ControlCode::Pause,
            _ = usr2.recv() => ControlCode::Continue,
            _ = hup.recv() => ControlCode::Interrogate,
        };

        log.info(format!("Received {code} request"));
        if requests.send(code).await.is_err() {
            return;
        }
    }
}

#[cfg(not(unix))]
async fn forward_signals(requests: mpsc::Sender<ControlCode>, log: ServiceLogger) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log.error(format!("Failed to listen for Ctrl+C: {e}"));
            return;
        }

        log.info("Received Ctrl+C, stopping");
        if requests.send(ControlCode::Stop).await.is_err() {
            return;
        }
    }
}
