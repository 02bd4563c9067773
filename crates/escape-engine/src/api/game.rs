use crate::api::types::{GameEvent, RequestId, SoundEvent};
use crate::input::queue::InputQueue;
use crate::rng::Rng;
use crate::service::{GenerateRequest, ServiceCall};

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of sound events per frame (default: 32).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 800.0,
            world_height: 600.0,
            max_sounds: 32,
            max_events: 32,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Apply a JSON configuration document supplied by the page.
    /// Called before `init`; games without settings ignore it.
    fn configure(&mut self, _json: &str) -> Result<(), serde_json::Error> {
        Ok(())
    }

    /// Setup initial state.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The game loop tick. Consume input, advance timers, emit events and service calls.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Read-only snapshot of what the page should display.
    fn view(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    /// Shared random source. Seeded by the runner; games may reseed it.
    pub rng: Rng,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    calls: Vec<ServiceCall>,
    next_request: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Create an EngineContext whose random source starts from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
            sounds: Vec::new(),
            events: Vec::new(),
            calls: Vec::new(),
            next_request: 1,
        }
    }

    /// Emit a sound event to be forwarded to the page.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to the page.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Queue an outbound AI service call. The reply comes back later as
    /// `InputEvent::ServiceReply` with the returned id.
    pub fn request(&mut self, request: GenerateRequest) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request += 1;
        log::debug!("service call {:?} queued", id);
        self.calls.push(ServiceCall { id, request });
        id
    }

    /// Service calls queued since the last drain.
    pub fn pending_calls(&self) -> &[ServiceCall] {
        &self.calls
    }

    /// Take all queued service calls. The runner hands them to its dispatcher.
    pub fn drain_calls(&mut self) -> Vec<ServiceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Clear per-frame transient data (sounds, events).
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
