use std::cell::RefCell;
use std::rc::Rc;

use escape_engine::{
    EngineContext, FixedTimestep, Game, GameConfig, InputEvent, InputQueue, RequestId,
    ServiceCall, ServiceConfig, ServiceResult,
};

/// Replies produced by spawned service calls, waiting for the next tick.
#[derive(Clone, Default)]
pub struct ReplyInbox(Rc<RefCell<Vec<(RequestId, ServiceResult)>>>);

impl ReplyInbox {
    pub fn deliver(&self, id: RequestId, result: ServiceResult) {
        self.0.borrow_mut().push((id, result));
    }

    pub fn take(&self) -> Vec<(RequestId, ServiceResult)> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Executes outbound service calls. Results go to the inbox, now or later.
pub trait Dispatcher {
    fn dispatch(&mut self, call: ServiceCall, config: &ServiceConfig, inbox: &ReplyInbox);
}

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    /// Fed to the extra fixed steps of a frame so input is seen once.
    no_input: InputQueue,
    timestep: FixedTimestep,
    config: GameConfig,
    service: ServiceConfig,
    dispatcher: Box<dyn Dispatcher>,
    inbox: ReplyInbox,
    initialized: bool,
    /// Flat buffer of sound event IDs read by the page.
    sound_buffer: Vec<u8>,
    view_json: String,
}

impl<G: Game> GameRunner<G> {
    /// Runner backed by the browser fetch dispatcher.
    pub fn new(game: G, seed: u64) -> Self {
        Self::with_dispatcher(game, seed, Box::new(crate::fetch::FetchDispatcher))
    }

    pub fn with_dispatcher(game: G, seed: u64, dispatcher: Box<dyn Dispatcher>) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let sound_buffer = Vec::with_capacity(config.max_sounds);
        let service = ServiceConfig::default().with_api_key(option_env!("GEMINI_API_KEY"));

        Self {
            game,
            ctx: EngineContext::with_seed(seed),
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            timestep,
            config,
            service,
            dispatcher,
            inbox: ReplyInbox::default(),
            initialized: false,
            sound_buffer,
            view_json: String::new(),
        }
    }

    /// Apply a page-supplied JSON document to the service settings and, before
    /// init, to the game. A document that fails to parse is logged and ignored.
    pub fn configure(&mut self, json: &str) {
        match ServiceConfig::from_json(json) {
            Ok(mut service) => {
                if service.api_key.is_none() {
                    service.api_key = self.service.api_key.take();
                }
                self.service = service;
            }
            Err(e) => log::warn!("ignoring service configuration: {e}"),
        }
        if self.initialized {
            log::warn!("game configured after init; game settings apply from the next init");
            return;
        }
        if let Err(e) = self.game.configure(json) {
            log::warn!("ignoring game configuration: {e}");
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.timestep = FixedTimestep::new(self.config.fixed_dt);
        self.game.init(&mut self.ctx);
        self.dispatch_calls();
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame tick: deliver replies, update game, dispatch new calls.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        for (id, result) in self.inbox.take() {
            self.input.push(InputEvent::ServiceReply { id, result });
        }

        let steps = self.timestep.accumulate(dt);
        if steps == 0 {
            return;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        self.game.update(&mut self.ctx, &self.input);
        for _ in 1..steps {
            self.game.update(&mut self.ctx, &self.no_input);
        }
        self.input.drain();

        self.dispatch_calls();

        // Pack sound events into flat buffer
        self.sound_buffer.clear();
        for sound in &self.ctx.sounds {
            self.sound_buffer.push(sound.0 as u8);
        }
    }

    fn dispatch_calls(&mut self) {
        for call in self.ctx.drain_calls() {
            log::debug!("dispatching service call {:?}", call.id);
            self.dispatcher.dispatch(call, &self.service, &self.inbox);
        }
    }

    /// JSON snapshot of the game's view. Valid until the next call.
    pub fn view_json(&mut self) -> &str {
        self.view_json = self.game.view().to_string();
        &self.view_json
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn service_config(&self) -> &ServiceConfig {
        &self.service
    }

    pub fn events(&self) -> &[escape_engine::GameEvent] {
        &self.ctx.events
    }

    // ---- Pointer accessors for direct memory reads ----

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn max_sounds(&self) -> u32 {
        self.config.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.config.max_events as u32
    }
}
