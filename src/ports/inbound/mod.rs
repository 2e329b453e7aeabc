/// Inbound ports (driving ports) - engine interfaces
///
/// These ports define what transports (HTTP, in-process callers) may ask
/// of the analysis engine.
pub mod analysis_port;

pub use analysis_port::{AnalysisError, AnalysisPort};
