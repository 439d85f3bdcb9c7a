// Test case generation pipeline
//
// request builds the provider payload, client drives it with retry and cost
// accounting, service ties sessions, records and the client together.

pub mod client;
pub mod error;
pub mod pricing;
pub mod prompts;
pub mod request;
pub mod service;

pub use client::{ChatTransport, GenerationClient, HttpTransport, MAX_RETRIES};
pub use error::GenerationError;
pub use pricing::{compute_cost, DEFAULT_MODEL, VISION_MODEL};
pub use request::{build_request, GenerationRequest, ModelSelection};
pub use service::GenerationService;
