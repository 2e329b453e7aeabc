/// Interface definitions between the analysis engine and the outside world.
///
/// Inbound ports are implemented by the engine and consumed by transports;
/// outbound ports are implemented by adapters (network, persistence) and
/// consumed by the engine.
pub mod inbound;
pub mod outbound;
