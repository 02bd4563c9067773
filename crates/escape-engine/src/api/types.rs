use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Identifier of an outbound AI service call.
/// Replies carry the same id so a challenge can drop answers it no longer waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u32);

/// A sound cue emitted by the game logic.
/// The numeric value maps to a sound registered by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// A game event communicated from Rust to the page through a flat float buffer.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;

    pub fn new(kind: f32, a: f32) -> Self {
        Self { kind, a, ..Self::default() }
    }
}
