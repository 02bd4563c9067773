pub mod fetch;
pub mod runner;

pub use escape_engine;
pub use fetch::FetchDispatcher;
pub use runner::{Dispatcher, GameRunner, ReplyInbox};

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner and a pending config document
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (game_init, game_configure, game_tick, input
///   handlers, the view snapshot, event buffer accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod game;
/// use game::MyGame;
///
/// escape_web::export_game!(MyGame, "my-game");
/// ```
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `escape_engine::Game`
///   and has a `new()` constructor
/// - `$game_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;
        use $crate::escape_engine::InputEvent;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
            static CONFIG: RefCell<Option<String>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                match borrow.as_mut() {
                    Some(runner) => Some(f(runner)),
                    None => {
                        log::warn!("{}: game_init() has not been called", $game_name);
                        None
                    }
                }
            })
        }

        fn push(event: InputEvent) {
            with_runner(|r| r.push_input(event));
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let seed = js_sys::Date::now().max(0.0) as u64;
            let mut runner = $crate::GameRunner::new(<$game_type>::new(), seed);
            if let Some(json) = CONFIG.with(|c| c.borrow().clone()) {
                runner.configure(&json);
            }
            runner.init();

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });
            log::info!("{}: initialized", $game_name);
        }

        /// Store a JSON config document. Service settings apply at once, game
        /// settings at the next `game_init`.
        #[wasm_bindgen]
        pub fn game_configure(json: &str) {
            CONFIG.with(|c| *c.borrow_mut() = Some(json.to_string()));
            RUNNER.with(|cell| {
                if let Some(runner) = cell.borrow_mut().as_mut() {
                    runner.configure(json);
                }
            });
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            push(InputEvent::PointerDown { x, y });
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            push(InputEvent::PointerUp { x, y });
        }

        #[wasm_bindgen]
        pub fn game_pointer_move(x: f32, y: f32) {
            push(InputEvent::PointerMove { x, y });
        }

        #[wasm_bindgen]
        pub fn game_pointer_leave() {
            push(InputEvent::PointerLeave);
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            push(InputEvent::KeyDown { key_code });
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            push(InputEvent::KeyUp { key_code });
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            push(InputEvent::Custom { kind, a, b, c });
        }

        #[wasm_bindgen]
        pub fn game_text_event(kind: u32, text: String) {
            push(InputEvent::Text { kind, text });
        }

        #[wasm_bindgen]
        pub fn game_view_json() -> String {
            with_runner(|r| r.view_json().to_string()).unwrap_or_else(|| "null".to_string())
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_sound_events_ptr() -> *const u8 {
            with_runner(|r| r.sound_events_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_sound_events_len() -> u32 {
            with_runner(|r| r.sound_events_len()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            with_runner(|r| r.game_events_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(|r| r.game_events_len()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f32 {
            with_runner(|r| r.world_width()).unwrap_or(0.0)
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f32 {
            with_runner(|r| r.world_height()).unwrap_or(0.0)
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn get_max_sounds() -> u32 {
            with_runner(|r| r.max_sounds()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events()).unwrap_or(0)
        }
    };
}
