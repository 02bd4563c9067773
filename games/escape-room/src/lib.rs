use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod game;
pub mod maze;
pub mod pending;
pub mod progression;
pub mod puzzle;
pub mod riddle;
pub mod transmission;

pub use config::EscapeConfig;
pub use game::EscapeRoom;

escape_web::export_game!(EscapeRoom, "escape-room");
