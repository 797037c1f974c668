pub mod console;
pub mod control_code;
pub mod control_loop;
pub mod http_listener;
pub mod install;
#[cfg(windows)]
pub mod scm;
pub mod service_machine;
pub mod service_state;
pub mod service_status;
pub mod startup;
pub mod tick_source;
