pub mod bridge;

use escape_engine::{Countdown, EngineContext, RequestId, ServiceResult};
use serde::Serialize;

use crate::pending::Pending;
use bridge::RiddleRecord;

/// Delay between an accepted answer and reporting completion (seconds).
pub const SUCCESS_DELAY: f32 = 1.5;
/// How long the error feedback stays up (seconds).
pub const ERROR_DELAY: f32 = 2.0;

/// Feedback shown next to the answer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Idle,
    Success,
    Error,
}

/// What a service reply did to the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Not a reply this challenge is waiting for.
    Ignored,
    RiddleLoaded,
    AnswerAccepted,
    AnswerRejected,
}

/// The riddle challenge: fetch a riddle once, then check answers until one is accepted.
pub struct RiddleChallenge {
    record: Pending<RiddleRecord>,
    verdict: Pending<bool>,
    submitted: String,
    feedback: Feedback,
    feedback_timer: Option<Countdown>,
}

impl RiddleChallenge {
    pub fn new() -> Self {
        Self {
            record: Pending::Idle,
            verdict: Pending::Idle,
            submitted: String::new(),
            feedback: Feedback::Idle,
            feedback_timer: None,
        }
    }

    /// Request the riddle. Only the first call per instance does anything.
    pub fn start(&mut self, ctx: &mut EngineContext) {
        if self.record == Pending::Idle {
            let id = ctx.request(bridge::challenge_request());
            self.record = Pending::InFlight(id);
            log::info!("riddle requested");
        }
    }

    pub fn record(&self) -> Option<&RiddleRecord> {
        self.record.ready()
    }

    pub fn is_loading(&self) -> bool {
        self.record.ready().is_none()
    }

    /// True while an answer is being checked.
    pub fn is_checking(&self) -> bool {
        self.verdict.is_in_flight()
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// True if `submit` would currently accept an answer.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && !self.is_checking() && self.feedback != Feedback::Success
    }

    /// Send `answer` for checking. Returns false when the submission is refused.
    pub fn submit(&mut self, ctx: &mut EngineContext, answer: &str) -> bool {
        if !self.can_submit() || answer.trim().is_empty() {
            return false;
        }
        let Some(record) = self.record.ready() else {
            return false;
        };
        let id = ctx.request(bridge::verify_request(&record.question, answer));
        self.verdict = Pending::InFlight(id);
        self.submitted = answer.to_string();
        self.feedback = Feedback::Idle;
        self.feedback_timer = None;
        true
    }

    /// Apply a service reply. Replies for other requests are ignored.
    pub fn on_reply(&mut self, id: RequestId, result: &ServiceResult) -> ReplyOutcome {
        if self.record.awaits(id) {
            self.record = Pending::Ready(bridge::challenge_from_reply(result));
            return ReplyOutcome::RiddleLoaded;
        }
        if !self.verdict.awaits(id) {
            return ReplyOutcome::Ignored;
        }

        let correct = bridge::verdict_from_reply(result, &self.submitted);
        self.verdict = Pending::Ready(correct);
        if correct {
            self.feedback = Feedback::Success;
            self.feedback_timer = Some(Countdown::new(SUCCESS_DELAY));
            log::info!("riddle answer accepted");
            ReplyOutcome::AnswerAccepted
        } else {
            self.feedback = Feedback::Error;
            self.feedback_timer = Some(Countdown::new(ERROR_DELAY));
            ReplyOutcome::AnswerRejected
        }
    }

    /// Advance feedback timers. Returns true once, when the success delay elapses.
    pub fn update(&mut self, dt: f32) -> bool {
        let fired = self.feedback_timer.as_mut().is_some_and(|t| t.tick(dt));
        if !fired {
            return false;
        }
        self.feedback_timer = None;
        match self.feedback {
            Feedback::Success => true,
            _ => {
                self.feedback = Feedback::Idle;
                false
            }
        }
    }
}

impl Default for RiddleChallenge {
    fn default() -> Self {
        Self::new()
    }
}
