//! Simulation scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// SIM-001: Burst of wheel ticks, then coast to rest
    WheelFlick,

    /// SIM-002: Mouse drag with a release kick
    DragThrow,

    /// SIM-003: Single-finger swipe
    TouchSwipe,

    /// SIM-004: Feed unavailable, zero cards
    EmptyFeed,

    /// SIM-005: Every texture load fails
    BrokenAssets,

    /// SIM-006: Frame hitches of several seconds
    FrameStall,

    /// SIM-007: Thousands of periods of scrolling, re-centering included
    LongHaul,

    /// SIM-008: No input at all
    IdleSettle,

    /// SIM-009: Seeded mix of every gesture
    RandomSession,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::WheelFlick,
            ScenarioId::DragThrow,
            ScenarioId::TouchSwipe,
            ScenarioId::EmptyFeed,
            ScenarioId::BrokenAssets,
            ScenarioId::FrameStall,
            ScenarioId::LongHaul,
            ScenarioId::IdleSettle,
            ScenarioId::RandomSession,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::WheelFlick => "wheel_flick",
            ScenarioId::DragThrow => "drag_throw",
            ScenarioId::TouchSwipe => "touch_swipe",
            ScenarioId::EmptyFeed => "empty_feed",
            ScenarioId::BrokenAssets => "broken_assets",
            ScenarioId::FrameStall => "frame_stall",
            ScenarioId::LongHaul => "long_haul",
            ScenarioId::IdleSettle => "idle_settle",
            ScenarioId::RandomSession => "random_session",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::WheelFlick => "10 wheel ticks, verify zoom rises then settles back to base fov",
            ScenarioId::DragThrow => "-100px drag in 5 moves, verify offset -1 plus release momentum",
            ScenarioId::TouchSwipe => "Touch swipe, verify it scrolls like a mouse drag",
            ScenarioId::EmptyFeed => "Feed fetch fails, verify zero transforms and a live camera",
            ScenarioId::BrokenAssets => "All textures fail, verify placeholders and unchanged layout",
            ScenarioId::FrameStall => "2-5s frame gaps, verify dt clamping keeps motion continuous",
            ScenarioId::LongHaul => "Huge scroll distance, verify re-centering without pops",
            ScenarioId::IdleSettle => "No input, verify nothing moves and fov is never touched",
            ScenarioId::RandomSession => "Seeded random gestures, verify every invariant each frame",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wheel_flick" | "wheelflick" | "sim-001" => Ok(ScenarioId::WheelFlick),
            "drag_throw" | "dragthrow" | "sim-002" => Ok(ScenarioId::DragThrow),
            "touch_swipe" | "touchswipe" | "sim-003" => Ok(ScenarioId::TouchSwipe),
            "empty_feed" | "emptyfeed" | "sim-004" => Ok(ScenarioId::EmptyFeed),
            "broken_assets" | "brokenassets" | "sim-005" => Ok(ScenarioId::BrokenAssets),
            "frame_stall" | "framestall" | "sim-006" => Ok(ScenarioId::FrameStall),
            "long_haul" | "longhaul" | "sim-007" => Ok(ScenarioId::LongHaul),
            "idle_settle" | "idlesettle" | "sim-008" => Ok(ScenarioId::IdleSettle),
            "random_session" | "randomsession" | "sim-009" => Ok(ScenarioId::RandomSession),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
