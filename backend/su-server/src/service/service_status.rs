use crate::ServiceState;

use std::fmt;

/// Control requests a state accepts, as the service manager's bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepts(pub u32);

impl Accepts {
    pub const NONE: Accepts = Accepts(0);
    pub const STOP: Accepts = Accepts(0x1);
    pub const PAUSE_CONTINUE: Accepts = Accepts(0x2);
    pub const SHUTDOWN: Accepts = Accepts(0x4);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Accepts) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Accepts {
    type Output = Accepts;

    fn bitor(self, rhs: Accepts) -> Accepts {
        Accepts(self.0 | rhs.0)
    }
}

/// Status reported to the service manager on every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStatus {
    pub state: ServiceState,
    pub accepts: Accepts,
}

impl ServiceStatus {
    /// Pending and stopped states accept nothing; a live service takes
    /// stop, pause/continue and shutdown.
    pub fn new(state: ServiceState) -> Self {
        let accepts = match state {
            ServiceState::Running | ServiceState::Paused => {
                Accepts::STOP | Accepts::PAUSE_CONTINUE | Accepts::SHUTDOWN
            }
            ServiceState::StartPending | ServiceState::StopPending | ServiceState::Stopped => {
                Accepts::NONE
            }
        };
        Self { state, accepts }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (accepts {:#x})", self.state, self.accepts.bits())
    }
}
