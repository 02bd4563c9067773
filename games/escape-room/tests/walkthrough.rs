//! Plays the whole room through the `Game` interface with the AI service offline.

use escape_engine::{
    EngineContext, Game, InputEvent, InputQueue, ServiceCall, ServiceError, ServiceResult,
};
use escape_room::game::*;
use escape_room::maze::MazeRunState;
use escape_room::progression::{ChallengeStatus, ChallengeType, View};
use escape_room::riddle::bridge::RiddleRecord;
use escape_room::riddle::Feedback;
use escape_room::transmission::TransmissionPhase;
use escape_room::{EscapeConfig, EscapeRoom};
use glam::Vec2;

struct Session {
    game: EscapeRoom,
    ctx: EngineContext,
}

impl Session {
    fn start(config: EscapeConfig) -> Self {
        let mut game = EscapeRoom::with_config(config);
        let mut ctx = EngineContext::with_seed(3);
        game.init(&mut ctx);
        Self { game, ctx }
    }

    fn send(&mut self, events: Vec<InputEvent>) {
        let mut input = InputQueue::new();
        for e in events {
            input.push(e);
        }
        self.ctx.clear_frame_data();
        self.game.update(&mut self.ctx, &input);
    }

    fn idle(&mut self, seconds: f32) {
        let steps = (seconds * 60.0).ceil() as usize + 1;
        for _ in 0..steps {
            self.send(Vec::new());
        }
    }

    fn command(&mut self, kind: u32) {
        self.send(vec![InputEvent::Custom { kind, a: 0.0, b: 0.0, c: 0.0 }]);
    }

    fn calls(&mut self) -> Vec<ServiceCall> {
        self.ctx.drain_calls()
    }

    fn reply(&mut self, call: &ServiceCall, result: ServiceResult) {
        self.send(vec![InputEvent::ServiceReply { id: call.id, result }]);
    }

    fn view(&self) -> View {
        self.game.progression().view()
    }

    fn solve_puzzle(&mut self) {
        let trail = self.game.puzzle().shuffle_trail().to_vec();
        let layout = self.game.layout();
        let size = self.game.puzzle().board().size();
        for &cell in trail.iter().rev() {
            let grid = Vec2::new((cell % size) as f32, (cell / size) as f32);
            let pos = layout.origin + (grid + Vec2::splat(0.5)) * layout.tile_size;
            self.send(vec![InputEvent::PointerDown { x: pos.x, y: pos.y }]);
            if self.game.puzzle().is_solved() {
                return;
            }
        }
    }

    fn trace_corridor(&mut self) {
        let points = self.game.maze().geometry().corridor.points().to_vec();
        let mut samples = Vec::new();
        for pair in points.windows(2) {
            let n = (pair[0].distance(pair[1]) / 5.0).ceil() as usize;
            for i in 0..=n {
                let p = pair[0].lerp(pair[1], i as f32 / n as f32);
                samples.push(InputEvent::PointerMove { x: p.x, y: p.y });
            }
        }
        self.send(samples);
    }
}

#[test]
fn solved_puzzle_unlocks_video_then_riddle() {
    let mut s = Session::start(EscapeConfig { seed: Some(21), ..EscapeConfig::default() });
    assert_eq!(s.game.puzzle().board().size(), 3);
    assert!(!s.game.puzzle().board().is_solved());

    s.solve_puzzle();
    assert!(s.game.puzzle().board().is_solved());
    assert_eq!(s.view(), View::Challenge(ChallengeType::Puzzle));

    s.idle(1.5);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Video));
    let state = s.game.progression().state();
    assert_eq!(state.puzzle, ChallengeStatus::Completed);
    assert_eq!(state.riddle, ChallengeStatus::Locked);

    // Continue is refused until the frame has been analyzed.
    s.command(CUSTOM_CONTINUE);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Video));

    s.command(CUSTOM_ANALYZE);
    let calls = s.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].request.image.is_some());
    s.reply(&calls[0], Err(ServiceError::MissingCredentials));
    assert_eq!(s.game.transmission().phase(), TransmissionPhase::Revealing);
    s.idle(2.0);
    assert_eq!(s.game.transmission().text(), "STATUS: SYSTEM OFFLINE. KEY MISSING.");

    s.command(CUSTOM_CONTINUE);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Riddle));
    assert_eq!(s.game.progression().state().riddle, ChallengeStatus::Active);
    assert_eq!(s.game.progression().state().maze, ChallengeStatus::Locked);
}

#[test]
fn full_run_with_service_offline() {
    let mut s = Session::start(EscapeConfig { seed: Some(8), allow_skip: true, ..EscapeConfig::default() });

    s.solve_puzzle();
    s.idle(1.5);
    s.command(CUSTOM_SKIP);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Riddle));

    // Riddle: generation fails, fallback question is shown.
    let fetch = s.calls();
    assert_eq!(fetch.len(), 1);
    s.send(vec![InputEvent::Text { kind: TEXT_SUBMIT_ANSWER, text: "shadow".into() }]);
    assert!(s.calls().is_empty(), "answers are refused while loading");
    s.reply(&fetch[0], Err(ServiceError::Transport("offline".into())));
    assert_eq!(s.game.riddle().record(), Some(&RiddleRecord::fallback()));

    // Wrong answer, judged locally.
    s.send(vec![InputEvent::Text { kind: TEXT_SUBMIT_ANSWER, text: "the moon".into() }]);
    let verify = s.calls();
    assert_eq!(verify.len(), 1);
    s.reply(&verify[0], Err(ServiceError::MissingCredentials));
    assert_eq!(s.game.riddle().feedback(), Feedback::Error);
    assert!(s.ctx.events.iter().any(|e| e.kind == EVENT_ANSWER_REJECTED));
    s.idle(2.0);
    assert_eq!(s.game.riddle().feedback(), Feedback::Idle);

    // Right answer, judged locally.
    s.send(vec![InputEvent::Text { kind: TEXT_SUBMIT_ANSWER, text: " Skuggi ".into() }]);
    let verify = s.calls();
    s.reply(&verify[0], Err(ServiceError::Status(503)));
    assert_eq!(s.game.riddle().feedback(), Feedback::Success);
    s.idle(1.5);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Maze));
    assert_eq!(s.game.progression().state().riddle, ChallengeStatus::Completed);

    // Maze: a sloppy run is lost, then reset and retraced.
    let start = s.game.maze().geometry().start.center;
    s.send(vec![
        InputEvent::PointerMove { x: start.x, y: start.y },
        InputEvent::PointerMove { x: start.x + 200.0, y: start.y },
    ]);
    assert_eq!(s.game.maze().state(), MazeRunState::Lost);
    assert!(s.ctx.events.iter().any(|e| e.kind == EVENT_MAZE_LOST));
    s.command(CUSTOM_RESET);
    assert_eq!(s.game.maze().state(), MazeRunState::Idle);

    s.trace_corridor();
    assert_eq!(s.game.maze().state(), MazeRunState::Won);
    s.idle(1.0);
    assert_eq!(s.view(), View::Reward);
    assert_eq!(s.game.progression().completed_count(), 3);

    let view = s.game.view();
    assert_eq!(view["view"], "REWARD");
    assert_eq!(view["unlocked"].as_array().map(Vec::len), Some(4));
    assert!(view["reward"]["qrUrl"].as_str().is_some_and(|u| u.contains("qrserver")));
}

#[test]
fn delayed_completion_waits_for_its_view() {
    let mut s = Session::start(EscapeConfig { seed: Some(4), allow_skip: true, ..EscapeConfig::default() });
    for _ in 0..3 {
        s.command(CUSTOM_SKIP);
    }
    assert_eq!(s.view(), View::Challenge(ChallengeType::Maze));

    s.trace_corridor();
    assert_eq!(s.game.maze().state(), MazeRunState::Won);

    // Leave before the delay runs out; nothing completes while away.
    s.send(vec![InputEvent::Custom { kind: CUSTOM_NAVIGATE, a: 0.0, b: 0.0, c: 0.0 }]);
    s.idle(2.0);
    assert_eq!(s.game.progression().state().maze, ChallengeStatus::Active);

    s.send(vec![InputEvent::Custom { kind: CUSTOM_NAVIGATE, a: 3.0, b: 0.0, c: 0.0 }]);
    s.idle(1.0);
    assert_eq!(s.view(), View::Reward);
}

#[test]
fn returning_to_solved_puzzle_does_not_strand_the_run() {
    let mut s = Session::start(EscapeConfig { seed: Some(13), ..EscapeConfig::default() });
    s.solve_puzzle();
    s.idle(1.5);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Video));

    s.send(vec![InputEvent::Custom { kind: CUSTOM_NAVIGATE, a: 0.0, b: 0.0, c: 0.0 }]);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Puzzle));
    assert!(s.game.puzzle().is_solved());
    assert_eq!(s.game.view()["unlocked"][1], "VIDEO");

    s.send(vec![InputEvent::Custom { kind: CUSTOM_NAVIGATE, a: 1.0, b: 0.0, c: 0.0 }]);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Video));

    s.command(CUSTOM_ANALYZE);
    let calls = s.calls();
    s.reply(&calls[0], Ok("A figure waits by the door.".into()));
    s.idle(3.0);
    s.command(CUSTOM_CONTINUE);
    assert_eq!(s.view(), View::Challenge(ChallengeType::Riddle));
    assert_eq!(s.game.progression().state().riddle, ChallengeStatus::Active);
}
