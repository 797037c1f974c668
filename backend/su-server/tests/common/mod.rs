#![allow(dead_code)]

//! Test infrastructure for su-server API and control loop tests

use su_core::{CoreResult, DeferredReplace, RestartTrigger, ServiceLogger, UpdateGuard};
use su_server::AppState;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use axum::body::Body;
use http::Request;
use log::{Level, LevelFilter, Log, Metadata, Record};
use tempfile::TempDir;

pub const BOUNDARY: &str = "su-test-boundary";
pub const EXECUTABLE_NAME: &str = "su-service";

/// Records schedule calls instead of touching the boot list.
#[derive(Default)]
pub struct RecordingReplacer {
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    /// When set, schedule blocks until the sender side sends or is dropped
    gate: Mutex<Option<mpsc::Receiver<()>>>,
}

impl RecordingReplacer {
    pub fn gated() -> (Arc<Self>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let replacer = Self {
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(Some(rx)),
        };
        (Arc::new(replacer), tx)
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl DeferredReplace for RecordingReplacer {
    fn schedule(&self, original: &Path, staged: &Path) -> CoreResult<()> {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            let _ = gate.recv();
        }
        self.calls
            .lock()
            .unwrap()
            .push((original.to_path_buf(), staged.to_path_buf()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[derive(Default)]
pub struct CountingRestart {
    pub requests: AtomicUsize,
}

impl CountingRestart {
    pub fn count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RestartTrigger for CountingRestart {
    fn request_restart(&self) -> CoreResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory log sink
#[derive(Default)]
pub struct CapturedLog {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CapturedLog {
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|line| line.contains(needle))
    }
}

impl Log for CapturedLog {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.lines
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

/// Service state wired to fakes, with the "executable" in a temp directory.
pub struct TestService {
    pub dir: TempDir,
    pub state: AppState,
    pub replacer: Arc<RecordingReplacer>,
    pub restart: Arc<CountingRestart>,
    pub log: Arc<CapturedLog>,
}

impl TestService {
    pub fn new() -> Self {
        Self::with_replacer(Arc::new(RecordingReplacer::default()))
    }

    pub fn with_replacer(replacer: Arc<RecordingReplacer>) -> Self {
        let dir = TempDir::new().unwrap();
        let executable = dir.path().join(EXECUTABLE_NAME);
        std::fs::write(&executable, b"running binary").unwrap();

        let log = Arc::new(CapturedLog::default());
        let restart = Arc::new(CountingRestart::default());

        let state = AppState {
            log: ServiceLogger::new(LevelFilter::Debug, log.clone()),
            update_guard: UpdateGuard::new(),
            replacer: replacer.clone(),
            restart: restart.clone(),
            executable_override: Some(executable),
            max_upload_bytes: 1 << 20,
        };

        Self {
            dir,
            state,
            replacer,
            restart,
            log,
        }
    }

    pub fn executable(&self) -> PathBuf {
        self.dir.path().join(EXECUTABLE_NAME)
    }

    pub fn staged(&self, basename: &str) -> PathBuf {
        self.dir.path().join(format!("{basename}_new"))
    }

    /// Wait for the background scheduling task to release the guard
    pub async fn settle(&self) {
        for _ in 0..200 {
            if !self.state.update_guard.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("update guard still held after 2s");
    }
}

/// Multipart body with one file field
pub fn multipart_body(field: &str, file_name: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
