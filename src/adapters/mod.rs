/// Concrete implementations of ports.
///
/// Inbound adapters drive the engine (HTTP transport); outbound adapters
/// are driven by it (network clients, persistence).
pub mod inbound;
pub mod outbound;
