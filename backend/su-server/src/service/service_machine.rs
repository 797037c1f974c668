//! Lifecycle state machine.
//!
//! Pure transition logic: [`ServiceMachine::handle`] decides what a control
//! request means in the current state and the control loop carries it out.

use crate::{ControlCode, ServiceState, ServiceStatus, TickSource};

use std::time::Duration;

/// What the control loop has to do for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Report `status`, wait `delay`, report it again
    Echo {
        status: ServiceStatus,
        delay: Duration,
    },
    /// Report the new status and drive the loop from `tick`
    Report {
        status: ServiceStatus,
        tick: TickSource,
    },
    /// Leave the loop and stop
    Exit,
    /// Not handled in this state; carries the raw code
    Ignored(u32),
}

#[derive(Debug, Clone)]
pub struct ServiceMachine {
    state: ServiceState,
    tick: TickSource,
    echo_delay: Duration,
}

impl ServiceMachine {
    pub fn new(echo_delay: Duration) -> Self {
        Self {
            state: ServiceState::StartPending,
            tick: TickSource::Normal,
            echo_delay,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn tick(&self) -> TickSource {
        self.tick
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus::new(self.state)
    }

    /// StartPending → Running, once the listener is up
    pub fn mark_running(&mut self) -> ServiceStatus {
        self.state = ServiceState::Running;
        self.tick = TickSource::Normal;
        self.status()
    }

    pub fn begin_stop(&mut self) -> ServiceStatus {
        self.state = ServiceState::StopPending;
        self.status()
    }

    pub fn finish(&mut self) -> ServiceStatus {
        self.state = ServiceState::Stopped;
        self.status()
    }

    pub fn handle(&mut self, code: ControlCode) -> Transition {
        let live = matches!(self.state, ServiceState::Running | ServiceState::Paused);

        match code {
            ControlCode::Interrogate => Transition::Echo {
                status: self.status(),
                delay: self.echo_delay,
            },
            ControlCode::Stop | ControlCode::Shutdown => Transition::Exit,
            ControlCode::Pause if live => {
                self.state = ServiceState::Paused;
                self.tick = TickSource::Slow;
                Transition::Report {
                    status: self.status(),
                    tick: self.tick,
                }
            }
            ControlCode::Continue if live => {
                self.state = ServiceState::Running;
                self.tick = TickSource::Normal;
                Transition::Report {
                    status: self.status(),
                    tick: self.tick,
                }
            }
            other => Transition::Ignored(other.raw()),
        }
    }
}
