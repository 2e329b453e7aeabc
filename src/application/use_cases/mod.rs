/// Use cases orchestrating domain logic behind the inbound surface.
mod submit_sbom;

pub use submit_sbom::{SubmitError, SubmitSbomUseCase};
