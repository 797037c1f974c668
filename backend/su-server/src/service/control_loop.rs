use crate::{
    ControlCode, HttpListener, ServerResult, ServiceMachine, ServiceStatus, TickSource, Transition,
};

use su_config::Config;
use su_core::{ServiceLogger, ShutdownCoordinator};

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, interval_at, timeout};

/// Timings of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub tick_interval: Duration,
    pub slow_tick_interval: Duration,
    pub interrogate_echo_delay: Duration,
    pub shutdown_grace: Duration,
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.service.tick_interval(),
            slow_tick_interval: config.service.slow_tick_interval(),
            interrogate_echo_delay: config.service.interrogate_echo_delay(),
            shutdown_grace: config.server.shutdown_grace(),
        }
    }

    fn interval_for(&self, tick: TickSource) -> Duration {
        match tick {
            TickSource::Normal => self.tick_interval,
            TickSource::Slow => self.slow_tick_interval,
        }
    }
}

/// Bridges service control requests to the running process and owns the
/// HTTP listener for the whole service lifetime.
pub struct ControlLoop {
    settings: LoopSettings,
    machine: ServiceMachine,
    listener: HttpListener,
    router: Router,
    log: ServiceLogger,
}

impl ControlLoop {
    pub fn new(
        settings: LoopSettings,
        listener: HttpListener,
        router: Router,
        log: ServiceLogger,
    ) -> Self {
        Self {
            machine: ServiceMachine::new(settings.interrogate_echo_delay),
            settings,
            listener,
            router,
            log,
        }
    }

    pub fn from_config(config: &Config, router: Router, log: ServiceLogger) -> Self {
        Self::new(
            LoopSettings::from_config(config),
            HttpListener::address(config.server.bind_addr()),
            router,
            log,
        )
    }

    /// Run until Stop or Shutdown.
    ///
    /// Every status change goes out on `changes`; the last one sent is
    /// StopPending. Reporting Stopped is left to the runner once this returns.
    /// A closed `requests` channel counts as Shutdown.
    pub async fn run(
        self,
        mut requests: mpsc::Receiver<ControlCode>,
        changes: mpsc::UnboundedSender<ServiceStatus>,
    ) -> ServerResult<()> {
        let ControlLoop {
            settings,
            mut machine,
            listener,
            router,
            log,
        } = self;
        let report = |status: ServiceStatus| {
            log.debug(format!("Service status: {status}"));
            // The runner may already be gone during teardown
            let _ = changes.send(status);
        };

        report(machine.status());

        let shutdown = ShutdownCoordinator::new();
        let (listener, local_addr) = listener.into_listener().await?;
        let mut server = Self::spawn_server(listener, router, &shutdown);
        log.info(format!("Update API listening on {local_addr}"));

        report(machine.mark_running());

        let mut ticker = Self::ticker(settings.tick_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => log.info("timer tick"),
                request = requests.recv() => {
                    let code = match request {
                        Some(code) => code,
                        None => {
                            log.warn("Control channel closed, shutting down");
                            ControlCode::Shutdown
                        }
                    };
                    log.debug(format!("Control request: {code}"));

                    match machine.handle(code) {
                        Transition::Echo { status, delay } => {
                            report(status);
                            tokio::time::sleep(delay).await;
                            report(status);
                        }
                        Transition::Report { status, tick } => {
                            report(status);
                            ticker = Self::ticker(settings.interval_for(tick));
                        }
                        Transition::Exit => break,
                        Transition::Ignored(raw) => log.error(format!(
                            "Unrecognised control code {raw} in state {}",
                            machine.state()
                        )),
                    }
                }
            }
        }

        report(machine.begin_stop());

        shutdown.shutdown();
        match timeout(settings.shutdown_grace, &mut server).await {
            Ok(Ok(Ok(()))) => log.info("Update API stopped"),
            Ok(Ok(Err(e))) => log.error(format!("Update API failed: {e}")),
            Ok(Err(e)) => log.error(format!("Update API task failed: {e}")),
            Err(_) => {
                log.warn(format!(
                    "Update API still busy after {:?}, closing it",
                    settings.shutdown_grace
                ));
                server.abort();
            }
        }

        Ok(())
    }

    fn spawn_server(
        listener: TcpListener,
        router: Router,
        shutdown: &ShutdownCoordinator,
    ) -> JoinHandle<std::io::Result<()>> {
        let mut guard = shutdown.subscribe_guard();

        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { guard.wait().await })
                .await
        })
    }

    /// First tick one period from now
    fn ticker(period: Duration) -> Interval {
        interval_at(Instant::now() + period, period)
    }
}
