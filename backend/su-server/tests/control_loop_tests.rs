//! Integration tests for the service control loop
mod common;

use crate::common::{BOUNDARY, TestService, multipart_body};

use su_server::{
    ControlCode, ControlLoop, HttpListener, LoopSettings, ServerResult, ServiceState,
    ServiceStatus, build_router,
};

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};

const ECHO_DELAY: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

struct RunningLoop {
    service: TestService,
    addr: SocketAddr,
    requests: mpsc::Sender<ControlCode>,
    changes: mpsc::UnboundedReceiver<ServiceStatus>,
    handle: JoinHandle<ServerResult<()>>,
}

fn default_settings() -> LoopSettings {
    LoopSettings {
        tick_interval: Duration::from_millis(200),
        slow_tick_interval: Duration::from_millis(400),
        interrogate_echo_delay: ECHO_DELAY,
        shutdown_grace: Duration::from_secs(1),
    }
}

impl RunningLoop {
    async fn start() -> Self {
        Self::start_with(default_settings()).await
    }

    async fn start_with(settings: LoopSettings) -> Self {
        let service = TestService::new();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let control_loop = ControlLoop::new(
            settings,
            HttpListener::bound(listener),
            build_router(service.state.clone()),
            service.state.log.clone(),
        );

        let (requests, requests_rx) = mpsc::channel(8);
        let (changes_tx, changes) = mpsc::unbounded_channel();
        let handle = tokio::spawn(control_loop.run(requests_rx, changes_tx));

        let mut running = Self {
            service,
            addr,
            requests,
            changes,
            handle,
        };
        assert_eq!(running.next_state().await, ServiceState::StartPending);
        assert_eq!(running.next_state().await, ServiceState::Running);
        running
    }

    async fn next_state(&mut self) -> ServiceState {
        timeout(WAIT, self.changes.recv())
            .await
            .expect("status change expected")
            .expect("status channel closed")
            .state
    }

    fn ticks(&self) -> usize {
        self.service
            .log
            .messages()
            .iter()
            .filter(|line| line.as_str() == "timer tick")
            .count()
    }

    /// Open an upload and send only the first half of its body.
    async fn start_upload(&self) -> (TcpStream, Vec<u8>) {
        let body = multipart_body("uploadfile", Some("su-service"), &vec![9u8; 64 * 1024]);
        let head = format!(
            "POST /api/v1/update/self?reboot=false HTTP/1.1\r\nHost: {}\r\nContent-Type: multipart/form-data; boundary={BOUNDARY}\r\nContent-Length: {}\r\n\r\n",
            self.addr,
            body.len()
        );

        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(&body[..body.len() / 2]).await.unwrap();
        stream.flush().await.unwrap();

        // The handler is in flight once the staging file exists
        let staged = self.service.staged("su-service");
        for _ in 0..200 {
            if staged.exists() {
                let rest = body[body.len() / 2..].to_vec();
                return (stream, rest);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("upload never reached the handler");
    }

    async fn send(&self, code: ControlCode) {
        self.requests.send(code).await.unwrap();
    }

    async fn stop(mut self) -> TestService {
        self.send(ControlCode::Stop).await;
        assert_eq!(self.next_state().await, ServiceState::StopPending);

        let result = timeout(WAIT, self.handle).await.unwrap().unwrap();
        assert!(result.is_ok());
        assert!(self.changes.recv().await.is_none(), "nothing after StopPending");
        self.service
    }
}

/// WHAT: Start, interrogate, pause, continue, stop produces the documented status sequence
/// WHY: The service manager relies on exactly these reports
#[tokio::test]
async fn given_running_loop_when_driven_through_lifecycle_then_statuses_in_order() {
    let mut running = RunningLoop::start().await;

    running.send(ControlCode::Interrogate).await;
    assert_eq!(running.next_state().await, ServiceState::Running);
    assert_eq!(running.next_state().await, ServiceState::Running);

    running.send(ControlCode::Pause).await;
    assert_eq!(running.next_state().await, ServiceState::Paused);

    running.send(ControlCode::Continue).await;
    assert_eq!(running.next_state().await, ServiceState::Running);

    running.stop().await;
}

#[tokio::test]
async fn given_interrogate_when_handled_then_two_echoes_separated_by_delay() {
    let mut running = RunningLoop::start().await;

    running.send(ControlCode::Interrogate).await;
    assert_eq!(running.next_state().await, ServiceState::Running);
    let first = Instant::now();
    assert_eq!(running.next_state().await, ServiceState::Running);

    // Measured from receipt of the first echo, so allow a little slack
    assert!(first.elapsed() >= ECHO_DELAY - Duration::from_millis(10));

    running.stop().await;
}

/// WHAT: Unknown control codes are logged and the loop keeps serving
/// WHY: A stray request from the service manager must never stop the service
#[tokio::test]
async fn given_unknown_code_when_sent_then_loop_keeps_running() {
    let mut running = RunningLoop::start().await;

    running.send(ControlCode::Other(200)).await;
    running.send(ControlCode::Interrogate).await;

    // The next report is the interrogate echo, nothing for the unknown code
    assert_eq!(running.next_state().await, ServiceState::Running);
    assert_eq!(running.next_state().await, ServiceState::Running);

    let service = running.stop().await;
    assert!(service.log.contains("Unrecognised control code 200"));
}

#[tokio::test]
async fn given_paused_loop_when_stopped_then_stop_pending_reported() {
    let mut running = RunningLoop::start().await;

    running.send(ControlCode::Pause).await;
    assert_eq!(running.next_state().await, ServiceState::Paused);

    running.stop().await;
}

#[tokio::test]
async fn given_shutdown_when_sent_then_loop_exits() {
    let mut running = RunningLoop::start().await;

    running.send(ControlCode::Shutdown).await;
    assert_eq!(running.next_state().await, ServiceState::StopPending);

    let result = timeout(WAIT, running.handle).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn given_closed_control_channel_when_loop_running_then_treated_as_shutdown() {
    let RunningLoop {
        requests,
        mut changes,
        handle,
        ..
    } = RunningLoop::start().await;

    drop(requests);

    let status = timeout(WAIT, changes.recv()).await.unwrap().unwrap();
    assert_eq!(status.state, ServiceState::StopPending);
    assert!(timeout(WAIT, handle).await.unwrap().unwrap().is_ok());
}

/// WHAT: The HTTP listener serves while running and is gone after stop
/// WHY: The listener's lifetime is bound to the service lifetime
#[tokio::test]
async fn given_running_loop_when_version_requested_then_served_until_stop() {
    let running = RunningLoop::start().await;
    let url = format!("http://{}/api/v1/version", running.addr);

    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), su_server::VERSION);

    let addr = running.addr;
    running.stop().await;

    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn given_ticks_elapsing_when_running_then_heartbeat_logged() {
    let running = RunningLoop::start().await;

    tokio::time::sleep(Duration::from_millis(450)).await;

    let service = running.stop().await;
    assert!(service.log.contains("timer tick"));
}

/// WHAT: An upload in flight at Stop is allowed to finish within the grace period
/// WHY: Stopping the service must not cut off an update that is about to complete
#[tokio::test]
async fn given_upload_in_flight_when_stopped_then_drained_before_grace_expires() {
    // Given: A running loop with a generous grace period and a half-sent upload
    let grace = Duration::from_secs(5);
    let mut running = RunningLoop::start_with(LoopSettings {
        shutdown_grace: grace,
        ..default_settings()
    })
    .await;
    let (mut stream, rest) = running.start_upload().await;

    // When: Stop arrives and the client then finishes the body
    running.send(ControlCode::Stop).await;
    assert_eq!(running.next_state().await, ServiceState::StopPending);
    let stopped_at = Instant::now();

    stream.write_all(&rest).await.unwrap();
    let mut response = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut response))
        .await
        .unwrap()
        .unwrap();

    // Then: The upload succeeded and the loop returned well inside the grace period
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");

    let result = timeout(WAIT, running.handle).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert!(stopped_at.elapsed() < grace);
    assert!(running.service.log.contains("Update API stopped"));
}

/// WHAT: A request still running when the grace period ends is cut off and the loop returns
/// WHY: A stuck client must never keep the service from stopping
#[tokio::test]
async fn given_stuck_upload_when_stopped_then_loop_returns_after_grace() {
    // Given: A short grace period and an upload whose body never completes
    let grace = Duration::from_millis(300);
    let mut running = RunningLoop::start_with(LoopSettings {
        shutdown_grace: grace,
        ..default_settings()
    })
    .await;
    let (_stream, _rest) = running.start_upload().await;

    // When: Stop arrives
    running.send(ControlCode::Stop).await;
    assert_eq!(running.next_state().await, ServiceState::StopPending);
    let stopped_at = Instant::now();

    // Then: run waits out the grace period, then returns
    let result = timeout(WAIT, running.handle).await.unwrap().unwrap();
    let elapsed = stopped_at.elapsed();
    assert!(result.is_ok());
    assert!(elapsed >= grace - Duration::from_millis(50), "returned after {elapsed:?}");
    assert!(elapsed < grace + Duration::from_secs(2), "returned after {elapsed:?}");
    assert!(running.service.log.contains("still busy"));
}

/// WHAT: Pause switches the heartbeat to the slow-tick period and Continue switches it back
/// WHY: The tick source follows the service state, not just the reported status
#[tokio::test]
async fn given_pause_then_continue_when_ticking_then_heartbeat_period_follows_state() {
    // Given: A long normal period and a short paused period
    let mut running = RunningLoop::start_with(LoopSettings {
        tick_interval: Duration::from_secs(10),
        slow_tick_interval: Duration::from_millis(50),
        ..default_settings()
    })
    .await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(running.ticks(), 0, "no tick expected on the normal period yet");

    // When: Paused, ticks arrive on the short period
    running.send(ControlCode::Pause).await;
    assert_eq!(running.next_state().await, ServiceState::Paused);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(running.ticks() >= 3, "got {} ticks while paused", running.ticks());

    // Then: After Continue the long period applies again
    running.send(ControlCode::Continue).await;
    assert_eq!(running.next_state().await, ServiceState::Running);
    let after_continue = running.ticks();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(running.ticks(), after_continue);

    running.stop().await;
}
