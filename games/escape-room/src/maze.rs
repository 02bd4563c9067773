use escape_engine::{Circle, Countdown, Polyline};
use glam::Vec2;

/// Delay between reaching the exit and reporting completion (seconds).
pub const COMPLETE_DELAY: f32 = 1.0;

/// Size of the maze play surface.
pub const SURFACE_SIZE: Vec2 = Vec2::new(600.0, 400.0);

/// Corridor centerline in surface coordinates.
const CORRIDOR: [[f32; 2]; 11] = [
    [50.0, 250.0],
    [150.0, 250.0],
    [150.0, 100.0],
    [300.0, 100.0],
    [300.0, 200.0],
    [200.0, 200.0],
    [200.0, 300.0],
    [400.0, 300.0],
    [400.0, 50.0],
    [550.0, 50.0],
    [550.0, 250.0],
];

/// Half of the corridor's safe width.
const HALF_WIDTH: f32 = 20.0;
const ANCHOR_RADIUS: f32 = 20.0;

/// Immutable corridor description: centerline, tolerance and the two anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct PathGeometry {
    pub corridor: Polyline,
    pub half_width: f32,
    pub start: Circle,
    pub end: Circle,
    /// Top-left corner and size of the play surface.
    pub surface_origin: Vec2,
    pub surface_size: Vec2,
}

impl PathGeometry {
    /// The standard corridor, with its surface placed at `origin` in world space.
    pub fn standard(origin: Vec2) -> Self {
        Self {
            corridor: Polyline::from_pairs(&CORRIDOR).translated(origin),
            half_width: HALF_WIDTH,
            start: Circle::new(Vec2::new(50.0, 250.0), ANCHOR_RADIUS).translated(origin),
            end: Circle::new(Vec2::new(550.0, 250.0), ANCHOR_RADIUS).translated(origin),
            surface_origin: origin,
            surface_size: SURFACE_SIZE,
        }
    }

    pub fn in_corridor(&self, p: Vec2) -> bool {
        self.corridor.within(p, self.half_width)
    }

    pub fn on_surface(&self, p: Vec2) -> bool {
        let local = p - self.surface_origin;
        local.x >= 0.0
            && local.y >= 0.0
            && local.x <= self.surface_size.x
            && local.y <= self.surface_size.y
    }
}

/// Run state of the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MazeRunState {
    Idle,
    Active,
    Won,
    Lost,
}

/// Tracks the pointer against a `PathGeometry`.
pub struct PathTracker {
    geometry: PathGeometry,
    state: MazeRunState,
    completion: Option<Countdown>,
    last_pos: Option<Vec2>,
}

impl PathTracker {
    pub fn new(geometry: PathGeometry) -> Self {
        Self {
            geometry,
            state: MazeRunState::Idle,
            completion: None,
            last_pos: None,
        }
    }

    pub fn state(&self) -> MazeRunState {
        self.state
    }

    pub fn geometry(&self) -> &PathGeometry {
        &self.geometry
    }

    /// Last pointer position seen on the surface.
    pub fn last_pos(&self) -> Option<Vec2> {
        self.last_pos
    }

    /// Feed a pointer sample in world coordinates. Returns the state afterwards.
    pub fn pointer_move(&mut self, p: Vec2) -> MazeRunState {
        if !self.geometry.on_surface(p) {
            return self.pointer_leave();
        }
        self.last_pos = Some(p);
        match self.state {
            MazeRunState::Idle => {
                if self.geometry.start.contains(p) {
                    self.state = MazeRunState::Active;
                    log::debug!("maze run started");
                }
            }
            MazeRunState::Active => {
                if self.geometry.end.contains(p) {
                    self.win();
                } else if !self.geometry.in_corridor(p) {
                    self.lose();
                }
            }
            MazeRunState::Won | MazeRunState::Lost => {}
        }
        self.state
    }

    /// The pointer left the play surface.
    pub fn pointer_leave(&mut self) -> MazeRunState {
        self.last_pos = None;
        if self.state == MazeRunState::Active {
            self.lose();
        }
        self.state
    }

    /// Back to IDLE. Only a lost run can be reset.
    pub fn reset(&mut self) -> bool {
        if self.state != MazeRunState::Lost {
            return false;
        }
        self.state = MazeRunState::Idle;
        true
    }

    /// Advance the completion delay. Returns true once, when it elapses.
    pub fn update(&mut self, dt: f32) -> bool {
        self.completion.as_mut().is_some_and(|c| c.tick(dt))
    }

    fn win(&mut self) {
        self.state = MazeRunState::Won;
        self.completion = Some(Countdown::new(COMPLETE_DELAY));
        log::info!("maze exit reached");
    }

    fn lose(&mut self) {
        self.state = MazeRunState::Lost;
        log::info!("maze run lost");
    }
}
