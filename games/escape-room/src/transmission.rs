//! The transmission step: a frozen video frame that the AI service describes
//! on request, revealed character by character.

use escape_engine::{
    EngineContext, GenerateRequest, ImageRef, RequestId, ServiceError, ServiceResult,
};
use serde::Serialize;

use crate::pending::Pending;

/// Seconds per revealed character.
pub const TYPEWRITER_INTERVAL: f32 = 0.05;

/// Shown instead of the frame when the page cannot display it.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400/000000/FFF?text=SIGNAL+LOST";

const ANALYSIS_PROMPT: &str = "Analyze this image as if it were a frozen frame from a corrupted \
video transmission. Describe the person's expression and action in a technical, sci-fi \
'status report' style. Keep it brief (under 30 words).";

const OFFLINE_NO_KEY: &str = "STATUS: SYSTEM OFFLINE. KEY MISSING.";
const SIGNAL_CORRUPTED: &str = "STATUS: SIGNAL CORRUPTED. UNABLE TO ANALYZE FRAME.";
const RECOGNITION_FAILED: &str = "STATUS: OFFLINE. IMAGE RECOGNITION FAILED.";
const SOURCE_UNREADABLE: &str = "ERROR: IMAGE SOURCE NOT FOUND OR UNREADABLE";

/// Reveals a string one character per interval.
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    shown: usize,
    interval: f32,
    elapsed: f32,
}

impl Typewriter {
    pub fn new(text: &str, interval: f32) -> Self {
        Self {
            chars: text.chars().collect(),
            shown: 0,
            interval: interval.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Advance time; returns true once everything is visible.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        while self.shown < self.chars.len() && self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.shown += 1;
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.chars.len()
    }

    /// The currently visible prefix.
    pub fn visible(&self) -> String {
        self.chars[..self.shown].iter().collect()
    }

    pub fn full(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Phase of the transmission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransmissionPhase {
    Standby,
    Analyzing,
    Revealing,
    Revealed,
}

/// Pick the text shown for a reply, substituting a fixed status line on failure.
pub fn analysis_text(reply: &ServiceResult) -> String {
    match reply {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) | Err(ServiceError::Empty) => SIGNAL_CORRUPTED.to_string(),
        Err(ServiceError::MissingCredentials) => OFFLINE_NO_KEY.to_string(),
        Err(ServiceError::Asset(_)) => SOURCE_UNREADABLE.to_string(),
        Err(e) => {
            log::warn!("transmission analysis failed: {e}");
            RECOGNITION_FAILED.to_string()
        }
    }
}

pub struct TransmissionChallenge {
    image: ImageRef,
    image_failed: bool,
    analysis: Pending<()>,
    typewriter: Option<Typewriter>,
}

impl TransmissionChallenge {
    pub fn new(image_url: &str) -> Self {
        Self {
            image: ImageRef {
                url: image_url.to_string(),
                mime_type: "image/png".to_string(),
            },
            image_failed: false,
            analysis: Pending::Idle,
            typewriter: None,
        }
    }

    pub fn phase(&self) -> TransmissionPhase {
        match (&self.analysis, &self.typewriter) {
            (Pending::Idle, _) => TransmissionPhase::Standby,
            (Pending::InFlight(_), _) => TransmissionPhase::Analyzing,
            (Pending::Ready(()), Some(t)) if !t.is_done() => TransmissionPhase::Revealing,
            (Pending::Ready(()), _) => TransmissionPhase::Revealed,
        }
    }

    /// URL the page should display for the frame.
    pub fn image_url(&self) -> &str {
        if self.image_failed {
            PLACEHOLDER_IMAGE_URL
        } else {
            &self.image.url
        }
    }

    /// The page could not display the frame.
    pub fn image_failed(&mut self) {
        if !self.image_failed {
            log::warn!("transmission image {} failed to load", self.image.url);
            self.image_failed = true;
        }
    }

    /// Text revealed so far.
    pub fn text(&self) -> String {
        self.typewriter.as_ref().map(Typewriter::visible).unwrap_or_default()
    }

    /// Ask the service to analyze the frame. Only accepted in standby.
    pub fn analyze(&mut self, ctx: &mut EngineContext) -> bool {
        if self.phase() != TransmissionPhase::Standby {
            return false;
        }
        let request = GenerateRequest::text(ANALYSIS_PROMPT).with_image(self.image.clone());
        self.analysis = Pending::InFlight(ctx.request(request));
        true
    }

    /// Apply a service reply. Returns false for replies this step is not waiting for.
    pub fn on_reply(&mut self, id: RequestId, result: &ServiceResult) -> bool {
        if !self.analysis.awaits(id) {
            return false;
        }
        let text = analysis_text(result);
        let mut typewriter = Typewriter::new(&text, TYPEWRITER_INTERVAL);
        if matches!(result, Err(ServiceError::Asset(_))) {
            // Load errors are shown at once.
            typewriter.tick(f32::MAX);
        }
        self.typewriter = Some(typewriter);
        self.analysis = Pending::Ready(());
        true
    }

    /// Advance the typewriter.
    pub fn update(&mut self, dt: f32) {
        if let Some(t) = self.typewriter.as_mut() {
            t.tick(dt);
        }
    }

    /// The continue action. Completes the step once the text is fully shown.
    pub fn proceed(&self) -> bool {
        self.phase() == TransmissionPhase::Revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typewriter_reveals_in_order() {
        let mut t = Typewriter::new("SIGNAL", 0.05);
        assert_eq!(t.visible(), "");
        t.tick(0.051);
        assert_eq!(t.visible(), "S");
        t.tick(0.1);
        assert_eq!(t.visible(), "SIG");
        assert!(t.tick(1.0));
        assert_eq!(t.visible(), t.full());
    }

    #[test]
    fn typewriter_handles_multibyte() {
        let mut t = Typewriter::new("Sæll", 0.05);
        t.tick(0.12);
        assert_eq!(t.visible(), "Sæ");
    }

    #[test]
    fn fallback_texts_per_failure() {
        assert_eq!(analysis_text(&Err(ServiceError::MissingCredentials)), OFFLINE_NO_KEY);
        assert_eq!(analysis_text(&Ok("  ".into())), SIGNAL_CORRUPTED);
        assert_eq!(analysis_text(&Err(ServiceError::Empty)), SIGNAL_CORRUPTED);
        assert_eq!(analysis_text(&Err(ServiceError::Asset("404".into()))), SOURCE_UNREADABLE);
        assert_eq!(analysis_text(&Err(ServiceError::Status(500))), RECOGNITION_FAILED);
        assert_eq!(analysis_text(&Ok("Subject smiling.".into())), "Subject smiling.");
    }

    #[test]
    fn full_flow_reaches_revealed() {
        let mut ctx = EngineContext::new();
        let mut step = TransmissionChallenge::new("/frissi.png");
        assert!(!step.proceed());
        assert!(step.analyze(&mut ctx));
        assert!(!step.analyze(&mut ctx));
        assert_eq!(step.phase(), TransmissionPhase::Analyzing);

        let call = ctx.drain_calls().remove(0);
        assert_eq!(call.request.image.as_ref().map(|i| i.url.as_str()), Some("/frissi.png"));
        assert!(!step.on_reply(RequestId(call.id.0 + 1), &Ok("x".into())));
        assert!(step.on_reply(call.id, &Ok("Subject alert.".into())));
        assert_eq!(step.phase(), TransmissionPhase::Revealing);
        assert!(!step.proceed());

        for _ in 0..60 {
            step.update(1.0 / 60.0);
        }
        assert_eq!(step.phase(), TransmissionPhase::Revealed);
        assert_eq!(step.text(), "Subject alert.");
        assert!(step.proceed());
    }

    #[test]
    fn asset_failure_is_shown_at_once() {
        let mut ctx = EngineContext::new();
        let mut step = TransmissionChallenge::new("/frissi.png");
        step.analyze(&mut ctx);
        let call = ctx.drain_calls().remove(0);
        step.on_reply(call.id, &Err(ServiceError::Asset("404".into())));
        assert_eq!(step.phase(), TransmissionPhase::Revealed);
        assert_eq!(step.text(), SOURCE_UNREADABLE);
    }

    #[test]
    fn placeholder_after_display_failure() {
        let mut step = TransmissionChallenge::new("/frissi.png");
        assert_eq!(step.image_url(), "/frissi.png");
        step.image_failed();
        assert_eq!(step.image_url(), PLACEHOLDER_IMAGE_URL);
    }
}
