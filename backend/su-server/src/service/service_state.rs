use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    StartPending,
    Running,
    Paused,
    StopPending,
    Stopped,
}

impl ServiceState {
    /// `dwCurrentState` value understood by the Windows service manager
    pub fn scm_code(self) -> u32 {
        match self {
            ServiceState::Stopped => 0x1,
            ServiceState::StartPending => 0x2,
            ServiceState::StopPending => 0x3,
            ServiceState::Running => 0x4,
            ServiceState::Paused => 0x7,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, ServiceState::StartPending | ServiceState::StopPending)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceState::StartPending => "start pending",
            ServiceState::Running => "running",
            ServiceState::Paused => "paused",
            ServiceState::StopPending => "stop pending",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
