/// Version reported by `GET /api/v1/version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn version() -> &'static str {
    VERSION
}
