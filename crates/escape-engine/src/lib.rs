pub mod api;
pub mod core;
pub mod geometry;
pub mod input;
pub mod rng;
pub mod service;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{GameEvent, RequestId, SoundEvent};
pub use core::time::{Countdown, FixedTimestep};
pub use geometry::{Circle, Polyline};
pub use input::queue::{InputEvent, InputQueue};
pub use rng::Rng;
pub use service::{
    GenerateRequest, ImageRef, ServiceCall, ServiceConfig, ServiceError, ServiceResult,
};
