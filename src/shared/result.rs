/// Type alias for Result with anyhow::Error as the error type.
/// This provides a consistent error handling pattern for wiring code
/// (configuration, startup, adapters) where errors are reported, not matched.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
