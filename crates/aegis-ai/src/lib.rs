//! Inference layer: interfaces for the vision, NLP, routing, and resource services,
//! with deterministic stand-ins until the real models are wired in.

mod error;
pub mod nlp;
pub mod resources;
pub mod rng;
pub mod routing;
pub mod vision;

pub use error::AiError;
pub use nlp::{BatchLabel, KeywordClassifier, MessageClassifier, MessageLabel};
pub use resources::{
    Action, NeedsRequest, Prediction, Recommendation, ResourcePredictor, StubPredictor,
};
pub use rng::InferenceRng;
pub use routing::{
    PlannedRoute, RouteAdjustment, RouteOptimizer, RoutePlan, RouteRequest, StubRouter,
};
pub use vision::{DetectedZone, Detection, StreamStatus, StubDetector, ZoneDetector};
