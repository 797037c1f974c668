use std::fmt;

/// Control request from the service manager (or a console signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    Stop,
    Pause,
    Continue,
    Interrogate,
    Shutdown,
    /// Anything else; logged and ignored
    Other(u32),
}

impl ControlCode {
    pub const STOP: u32 = 0x1;
    pub const PAUSE: u32 = 0x2;
    pub const CONTINUE: u32 = 0x3;
    pub const INTERROGATE: u32 = 0x4;
    pub const SHUTDOWN: u32 = 0x5;

    pub fn from_raw(raw: u32) -> Self {
        match raw {
            Self::STOP => ControlCode::Stop,
            Self::PAUSE => ControlCode::Pause,
            Self::CONTINUE => ControlCode::Continue,
            Self::INTERROGATE => ControlCode::Interrogate,
            Self::SHUTDOWN => ControlCode::Shutdown,
            other => ControlCode::Other(other),
        }
    }

    /// Whether the control loop acts on this code. The service manager is
    /// told the call is not implemented for anything else.
    pub fn is_handled(self) -> bool {
        !matches!(self, ControlCode::Other(_))
    }

    pub fn raw(self) -> u32 {
        match self {
            ControlCode::Stop => Self::STOP,
            ControlCode::Pause => Self::PAUSE,
            ControlCode::Continue => Self::CONTINUE,
            ControlCode::Interrogate => Self::INTERROGATE,
            ControlCode::Shutdown => Self::SHUTDOWN,
            ControlCode::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ControlCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCode::Stop => f.write_str("stop"),
            ControlCode::Pause => f.write_str("pause"),
            ControlCode::Continue => f.write_str("continue"),
            ControlCode::Interrogate => f.write_str("interrogate"),
            ControlCode::Shutdown => f.write_str("shutdown"),
            ControlCode::Other(raw) => write!(f, "control code {raw}"),
        }
    }
}
