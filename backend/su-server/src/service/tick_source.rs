/// Heartbeat timer driving the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickSource {
    #[default]
    Normal,
    /// Used while paused
    Slow,
}
