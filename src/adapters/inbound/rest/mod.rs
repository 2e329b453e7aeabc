/// HTTP transport over the analysis engine.
mod handlers;

pub use handlers::{router, AppState};
