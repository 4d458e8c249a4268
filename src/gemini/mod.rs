pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{
    DEFAULT_MODEL, DEFAULT_VOICE, Endpoints, GeminiClient, MAX_TTS_CHARS, tts_request_preview,
};
pub use error::{GeminiError, Operation};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use types::{GenerationRequest, SynthesisRequest};
