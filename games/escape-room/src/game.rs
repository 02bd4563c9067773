use escape_engine::*;
use glam::Vec2;
use serde_json::{json, Value};

use crate::config::EscapeConfig;
use crate::maze::{MazeRunState, PathGeometry, PathTracker};
use crate::progression::{ChallengeStatus, ChallengeType, Progression, View, ALL_VIEWS};
use crate::puzzle::{MoveOutcome, PuzzleChallenge, PuzzleLayout};
use crate::riddle::{ReplyOutcome, RiddleChallenge};
use crate::transmission::TransmissionChallenge;

const WORLD_WIDTH: f32 = 800.0;
const WORLD_HEIGHT: f32 = 600.0;
const FIXED_DT: f32 = 1.0 / 60.0;
const TILE_SIZE: f32 = 96.0;
const MAZE_ORIGIN: Vec2 = Vec2::new(100.0, 100.0);

// Custom event kinds (page → game)
pub const CUSTOM_NAVIGATE: u32 = 1;
pub const CUSTOM_RESET: u32 = 2;
pub const CUSTOM_SKIP: u32 = 3;
pub const CUSTOM_ANALYZE: u32 = 4;
pub const CUSTOM_CONTINUE: u32 = 5;
pub const CUSTOM_IMAGE_FAILED: u32 = 6;

// Text event kinds (page → game)
pub const TEXT_SUBMIT_ANSWER: u32 = 1;

// Game event kinds (game → page)
pub const EVENT_VIEW_CHANGED: f32 = 1.0;
pub const EVENT_PUZZLE_SOLVED: f32 = 2.0;
pub const EVENT_MAZE_LOST: f32 = 3.0;
pub const EVENT_ANSWER_ACCEPTED: f32 = 4.0;
pub const EVENT_ANSWER_REJECTED: f32 = 5.0;
pub const EVENT_RIDDLE_LOADED: f32 = 6.0;

// Sound cues
pub const SOUND_TILE: SoundEvent = SoundEvent(0);
pub const SOUND_SUCCESS: SoundEvent = SoundEvent(1);
pub const SOUND_FAILURE: SoundEvent = SoundEvent(2);

/// The escape room: four challenges sequenced by a `Progression`.
pub struct EscapeRoom {
    config: EscapeConfig,
    progression: Progression,
    layout: PuzzleLayout,
    puzzle: PuzzleChallenge,
    transmission: TransmissionChallenge,
    riddle: RiddleChallenge,
    maze: PathTracker,
    started: bool,
}

impl EscapeRoom {
    pub fn new() -> Self {
        Self::with_config(EscapeConfig::default())
    }

    pub fn with_config(config: EscapeConfig) -> Self {
        // Placeholder board; `init` reshuffles from the engine's rng.
        let mut rng = Rng::new(config.seed.unwrap_or(1));
        let puzzle = PuzzleChallenge::new(config.grid_size, &mut rng);
        let size = puzzle.board().size();
        Self {
            layout: PuzzleLayout::centered(size, TILE_SIZE, WORLD_WIDTH, WORLD_HEIGHT),
            puzzle,
            transmission: TransmissionChallenge::new(&config.transmission_image_url),
            riddle: RiddleChallenge::new(),
            maze: PathTracker::new(PathGeometry::standard(MAZE_ORIGIN)),
            progression: Progression::new(),
            config,
            started: false,
        }
    }

    pub fn config_ref(&self) -> &EscapeConfig {
        &self.config
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn puzzle(&self) -> &PuzzleChallenge {
        &self.puzzle
    }

    pub fn layout(&self) -> PuzzleLayout {
        self.layout
    }

    pub fn transmission(&self) -> &TransmissionChallenge {
        &self.transmission
    }

    pub fn riddle(&self) -> &RiddleChallenge {
        &self.riddle
    }

    pub fn maze(&self) -> &PathTracker {
        &self.maze
    }

    fn showing(&self, challenge: ChallengeType) -> bool {
        self.progression.view() == View::Challenge(challenge)
    }

    /// Hand a finished challenge to the progression and follow it to the next view.
    fn complete(&mut self, ctx: &mut EngineContext, challenge: ChallengeType) {
        if let Some(next) = self.progression.on_challenge_complete(challenge) {
            self.enter_view(ctx, next);
        }
    }

    fn enter_view(&mut self, ctx: &mut EngineContext, view: View) {
        if view == View::Challenge(ChallengeType::Riddle) {
            self.riddle.start(ctx);
        }
        ctx.emit_event(GameEvent {
            kind: EVENT_VIEW_CHANGED,
            a: view.code() as f32,
            b: self.progression.completed_count() as f32,
            c: 0.0,
        });
    }

    fn on_command(&mut self, ctx: &mut EngineContext, kind: u32, a: f32) {
        match kind {
            CUSTOM_NAVIGATE => {
                let Some(view) = View::from_code(a as u32) else {
                    log::warn!("navigate to unknown view {a}");
                    return;
                };
                if self.progression.navigate(view) {
                    self.enter_view(ctx, view);
                } else {
                    log::debug!("navigation to {} refused", view.name());
                }
            }
            CUSTOM_RESET => match self.progression.view() {
                View::Challenge(ChallengeType::Puzzle) => self.puzzle.reset(&mut ctx.rng),
                View::Challenge(ChallengeType::Maze) => {
                    self.maze.reset();
                }
                _ => {}
            },
            CUSTOM_SKIP => {
                if !self.config.allow_skip {
                    log::warn!("skip ignored: developer skips are disabled");
                    return;
                }
                if let View::Challenge(challenge) = self.progression.view() {
                    log::info!("skipping {challenge:?}");
                    self.complete(ctx, challenge);
                }
            }
            CUSTOM_ANALYZE => {
                if self.showing(ChallengeType::Video) {
                    self.transmission.analyze(ctx);
                }
            }
            CUSTOM_CONTINUE => {
                if self.showing(ChallengeType::Video) && self.transmission.proceed() {
                    self.complete(ctx, ChallengeType::Video);
                }
            }
            CUSTOM_IMAGE_FAILED => self.transmission.image_failed(),
            _ => log::debug!("unknown custom event {kind}"),
        }
    }

    fn on_reply(&mut self, ctx: &mut EngineContext, id: RequestId, result: &ServiceResult) {
        if self.transmission.on_reply(id, result) {
            return;
        }
        match self.riddle.on_reply(id, result) {
            ReplyOutcome::RiddleLoaded => ctx.emit_event(GameEvent::new(EVENT_RIDDLE_LOADED, 0.0)),
            ReplyOutcome::AnswerAccepted => {
                ctx.emit_event(GameEvent::new(EVENT_ANSWER_ACCEPTED, 0.0));
                ctx.emit_sound(SOUND_SUCCESS);
            }
            ReplyOutcome::AnswerRejected => {
                ctx.emit_event(GameEvent::new(EVENT_ANSWER_REJECTED, 0.0));
                ctx.emit_sound(SOUND_FAILURE);
            }
            ReplyOutcome::Ignored => log::debug!("dropping stale reply {id:?}"),
        }
    }

    fn click_tile(&mut self, ctx: &mut EngineContext, pos: Vec2) {
        let Some(cell) = self.layout.cell_at(pos, self.puzzle.board().size()) else {
            return;
        };
        match self.puzzle.click(cell) {
            MoveOutcome::Moved => ctx.emit_sound(SOUND_TILE),
            MoveOutcome::Solved => {
                ctx.emit_sound(SOUND_SUCCESS);
                ctx.emit_event(GameEvent::new(EVENT_PUZZLE_SOLVED, self.puzzle.moves() as f32));
            }
            MoveOutcome::Rejected => {}
        }
    }

    fn trace(&mut self, ctx: &mut EngineContext, pos: Option<Vec2>) {
        let before = self.maze.state();
        let after = match pos {
            Some(p) => self.maze.pointer_move(p),
            None => self.maze.pointer_leave(),
        };
        if before == after {
            return;
        }
        match after {
            MazeRunState::Lost => {
                ctx.emit_event(GameEvent::new(EVENT_MAZE_LOST, 0.0));
                ctx.emit_sound(SOUND_FAILURE);
            }
            MazeRunState::Won => ctx.emit_sound(SOUND_SUCCESS),
            MazeRunState::Idle | MazeRunState::Active => {}
        }
    }

    /// Advance the countdowns of the displayed challenge only, so a delayed
    /// completion never lands while another view is showing.
    fn tick(&mut self, ctx: &mut EngineContext, dt: f32) {
        let View::Challenge(challenge) = self.progression.view() else {
            return;
        };
        let finished = match challenge {
            ChallengeType::Puzzle => self.puzzle.update(dt),
            ChallengeType::Video => {
                self.transmission.update(dt);
                false
            }
            ChallengeType::Riddle => self.riddle.update(dt),
            ChallengeType::Maze => self.maze.update(dt),
        };
        if finished {
            self.complete(ctx, challenge);
        }
    }

    fn puzzle_view(&self) -> Value {
        let origin = self.layout.origin;
        json!({
            "size": self.puzzle.board().size(),
            "cells": self.puzzle.board().cells(),
            "solved": self.puzzle.is_solved(),
            "moves": self.puzzle.moves(),
            "origin": [origin.x, origin.y],
            "tileSize": self.layout.tile_size,
        })
    }

    fn transmission_view(&self) -> Value {
        json!({
            "phase": self.transmission.phase(),
            "imageUrl": self.transmission.image_url(),
            "text": self.transmission.text(),
        })
    }

    fn riddle_view(&self) -> Value {
        let record = self.riddle.record();
        json!({
            "loading": self.riddle.is_loading(),
            "checking": self.riddle.is_checking(),
            "question": record.map(|r| r.question.as_str()),
            "hint": record.map(|r| r.hint.as_str()),
            "feedback": self.riddle.feedback(),
            "canSubmit": self.riddle.can_submit(),
        })
    }

    fn maze_view(&self) -> Value {
        let geometry = self.maze.geometry();
        let corridor: Vec<[f32; 2]> = geometry.corridor.points().iter().map(|p| [p.x, p.y]).collect();
        json!({
            "state": self.maze.state(),
            "origin": [geometry.surface_origin.x, geometry.surface_origin.y],
            "size": [geometry.surface_size.x, geometry.surface_size.y],
            "corridor": corridor,
            "halfWidth": geometry.half_width,
            "start": { "center": [geometry.start.center.x, geometry.start.center.y], "radius": geometry.start.radius },
            "end": { "center": [geometry.end.center.x, geometry.end.center.y], "radius": geometry.end.radius },
            "pointer": self.maze.last_pos().map(|p| [p.x, p.y]),
        })
    }
}

impl Default for EscapeRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for EscapeRoom {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: FIXED_DT,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            ..GameConfig::default()
        }
    }

    fn configure(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let config = EscapeConfig::from_json(json)?;
        if self.started {
            // Progress lives for the session; only the flags the running room reads change.
            log::info!("escape room reconfigured in play: {config:?}");
            self.config.allow_skip = config.allow_skip;
            self.config.reward_qr_url = config.reward_qr_url;
            return Ok(());
        }
        log::info!("escape room configured: {config:?}");
        *self = Self::with_config(config);
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        if let Some(seed) = self.config.seed {
            ctx.rng = Rng::new(seed);
        }
        self.puzzle = PuzzleChallenge::new(self.config.grid_size, &mut ctx.rng);
        self.enter_view(ctx, self.progression.view());
        self.started = true;
        let size = self.puzzle.board().size();
        log::info!("escape room ready, {size}x{size} board");
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter() {
            match event {
                InputEvent::ServiceReply { id, result } => self.on_reply(ctx, *id, result),
                InputEvent::Custom { kind, a, .. } => self.on_command(ctx, *kind, *a),
                InputEvent::Text { kind, text } if *kind == TEXT_SUBMIT_ANSWER => {
                    if self.showing(ChallengeType::Riddle) {
                        self.riddle.submit(ctx, text);
                    }
                }
                InputEvent::PointerDown { x, y } if self.showing(ChallengeType::Puzzle) => {
                    self.click_tile(ctx, Vec2::new(*x, *y));
                }
                InputEvent::PointerMove { x, y } if self.showing(ChallengeType::Maze) => {
                    self.trace(ctx, Some(Vec2::new(*x, *y)));
                }
                InputEvent::PointerLeave if self.showing(ChallengeType::Maze) => {
                    self.trace(ctx, None);
                }
                _ => {}
            }
        }

        self.tick(ctx, FIXED_DT);
    }

    fn view(&self) -> Value {
        let unlocked: Vec<&str> = ALL_VIEWS
            .iter()
            .filter(|v| self.progression.can_navigate(**v))
            .map(|v| v.name())
            .collect();
        let reward = (self.progression.state().maze == ChallengeStatus::Completed)
            .then(|| json!({ "qrUrl": self.config.reward_qr_url }));

        json!({
            "view": self.progression.view().name(),
            "progress": self.progression.state(),
            "completed": self.progression.completed_count(),
            "total": 3,
            "unlocked": unlocked,
            "allowSkip": self.config.allow_skip,
            "puzzle": self.puzzle_view(),
            "transmission": self.transmission_view(),
            "riddle": self.riddle_view(),
            "maze": self.maze_view(),
            "reward": reward,
        })
    }
}
