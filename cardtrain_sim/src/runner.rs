//! Scenario runner - drives the engine through scripted sessions.
//!
//! Every run owns a fresh single-threaded Tokio runtime, a `SimContext`
//! virtual clock and a `RecordingRenderer`. Frames advance the clock by a
//! fixed step (or a scheduled stall); scripted input is delivered through
//! the engine's input queue as soon as its timestamp has passed.

use crate::assets::{FeedMode, SimAssetLoader, SimFeedSource};
use crate::context::SimContext;
use crate::exporter::{SimExport, SimFrame};
use crate::gestures::GestureScript;
use crate::invariants::InvariantChecker;
use crate::renderer::RecordingRenderer;
use crate::scenarios::ScenarioId;
use crate::visualizer::RerunLogger;

use cardtrain_core::{CardAppearance, FrameReport, InputQueue, LayeredGlass, ScrollState, TrainConfig, TrainEngine};
use cardtrain_env::{LayerState, TrainContext};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The engine as driven by the simulator.
pub type SimEngine = TrainEngine<SimContext, RecordingRenderer>;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Total frames rendered
    pub total_frames: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Cards on the rail
    pub card_count: usize,

    /// Scroll offset after the last frame
    pub final_offset: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Input events delivered
    pub input_events: u64,

    /// Times the engine pushed a new fov
    pub fov_updates: u64,

    pub peak_fov: f64,
    pub peak_activity: f64,
    pub max_abs_velocity: f64,

    /// Largest sanitized frame dt (seconds)
    pub max_dt: f64,

    /// Frames whose raw gap exceeded the dt clamp
    pub stalls: u64,

    pub recenters: u64,
    pub assets_loaded: usize,
    pub assets_failed: usize,

    /// Largest continuity error seen by the invariant checker
    pub max_discontinuity: f64,
}

impl ScenarioMetrics {
    fn record(&mut self, report: &FrameReport) {
        if report.fov_changed {
            self.fov_updates += 1;
        }
        if report.recentered {
            self.recenters += 1;
        }
        self.peak_fov = self.peak_fov.max(report.fov);
        self.peak_activity = self.peak_activity.max(report.state.activity);
        self.max_abs_velocity = self.max_abs_velocity.max(report.state.velocity.abs());
        self.max_dt = self.max_dt.max(report.dt);
    }
}

/// Scroll state sampled after one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub time_sec: f64,

    /// Clock gap before this frame, before clamping
    pub raw_dt: f64,

    /// dt the engine integrated with
    pub dt: f64,

    pub state: ScrollState,
    pub fov: f64,
    pub dragging: bool,
}

/// Where the scroll offset starts.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StartOffset {
    Zero,

    /// This many turns short of the re-centering threshold
    BeforeRecenter(f64),
}

/// Everything a single simulated session needs.
struct SimSetup {
    feed: SimFeedSource,
    loader: SimAssetLoader,
    script: GestureScript,

    /// Frame index → clock gap in seconds, replacing the regular frame step
    stalls: BTreeMap<u64, f64>,

    duration_secs: f64,
    start: StartOffset,
}

/// A finished session, kept around for scenario assertions.
pub struct SimRun {
    pub engine: SimEngine,
    pub checker: InvariantChecker,
    pub metrics: ScenarioMetrics,
    pub history: Vec<FrameSample>,
    pub export: SimExport,
    pub frames: u64,
    pub time_secs: f64,
}

/// Runs simulation scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Cards in the generated feed
    cards: usize,

    /// Frames per second
    fps: u32,

    /// Maximum duration in seconds
    max_duration_secs: f64,

    /// Engine configuration
    config: TrainConfig,

    /// Stream to a Rerun viewer
    visualize: bool,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, cards: usize) -> Self {
        Self {
            seed,
            cards,
            fps: 60,
            max_duration_secs: 10.0,
            config: TrainConfig::default(),
            visualize: false,
        }
    }

    /// Sets the frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Replaces the engine configuration.
    pub fn with_config(mut self, config: TrainConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables Rerun logging (needs the `visualization` feature).
    pub fn with_visualization(mut self, enabled: bool) -> Self {
        self.visualize = enabled;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_with_export(scenario).0
    }

    /// Runs a scenario and also returns its sampled frames.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, SimExport) {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let outcome = match scenario {
            ScenarioId::WheelFlick => self.run_wheel_flick(),
            ScenarioId::DragThrow => self.run_drag_throw(),
            ScenarioId::TouchSwipe => self.run_touch_swipe(),
            ScenarioId::EmptyFeed => self.run_empty_feed(),
            ScenarioId::BrokenAssets => self.run_broken_assets(),
            ScenarioId::FrameStall => self.run_frame_stall(),
            ScenarioId::LongHaul => self.run_long_haul(),
            ScenarioId::IdleSettle => self.run_idle_settle(),
            ScenarioId::RandomSession => self.run_random_session(),
        };

        match outcome {
            Ok((run, failure)) => self.finish(scenario, run, failure),
            Err(reason) => {
                warn!(scenario = scenario.name(), %reason, "scenario could not run");
                let mut export = SimExport::new(scenario.name(), self.seed, 0);
                export.finalize(false, Some(reason.clone()));
                let result = ScenarioResult {
                    scenario,
                    seed: self.seed,
                    passed: false,
                    total_frames: 0,
                    final_time_secs: 0.0,
                    card_count: 0,
                    final_offset: 0.0,
                    failure_reason: Some(reason),
                    metrics: ScenarioMetrics::default(),
                };
                (result, export)
            }
        }
    }

    /// SIM-001: WheelFlick - burst of wheel ticks, then coast.
    ///
    /// **Assertion**: fov rises towards the zoomed value while scrolling and
    /// returns to base once motion has died out; offset moves forward.
    fn run_wheel_flick(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-001: WheelFlick");
        let script = GestureScript::wheel_flick(Duration::from_millis(500), 10, Duration::from_millis(16), 120.0);
        let run = self.simulate(ScenarioId::WheelFlick, self.default_setup(script, 4.0))?;

        let camera = &self.config.camera;
        let last = run.history.last().copied();
        let failure = if run.metrics.peak_fov < camera.base_fov_deg + camera.zoom_fov_add * 0.5 {
            Some(format!("peak fov {:.3} never approached the zoomed value", run.metrics.peak_fov))
        } else if let Some(last) = last.filter(|s| (s.fov - camera.base_fov_deg).abs() > 0.01) {
            Some(format!("fov {:.4} did not settle back to base", last.fov))
        } else if last.map_or(true, |s| s.state.offset <= 0.2) {
            Some("wheel scroll did not move the train forward".to_string())
        } else {
            None
        };
        Ok((run, failure))
    }

    /// SIM-002: DragThrow - mouse drag with release momentum.
    ///
    /// **Assertion**: -100px of drag moves offset by exactly -1 while held;
    /// the release kick carries it a little further in the same direction.
    fn run_drag_throw(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-002: DragThrow");
        let script = GestureScript::drag_throw(Duration::from_millis(500), 400.0, 300.0, 5, Duration::from_millis(16));
        let run = self.simulate(ScenarioId::DragThrow, self.default_setup(script, 3.0))?;
        let failure = check_throw(&run, -1.0);
        Ok((run, failure))
    }

    /// SIM-003: TouchSwipe - single-finger swipe.
    ///
    /// **Assertion**: identical semantics to a mouse drag.
    fn run_touch_swipe(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-003: TouchSwipe");
        let script = GestureScript::touch_swipe(Duration::from_millis(500), 300.0, 500.0, 5, Duration::from_millis(16));
        let run = self.simulate(ScenarioId::TouchSwipe, self.default_setup(script, 3.0))?;
        let failure = check_throw(&run, 2.0);
        Ok((run, failure))
    }

    /// SIM-004: EmptyFeed - the feed cannot be fetched.
    ///
    /// **Assertion**: zero cards, zero transforms, camera still zooms.
    fn run_empty_feed(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-004: EmptyFeed");
        let mut setup = self.default_setup(
            GestureScript::wheel_flick(Duration::from_millis(200), 8, Duration::from_millis(20), 150.0),
            2.0,
        );
        setup.feed = SimFeedSource::new(FeedMode::Unavailable);
        let run = self.simulate(ScenarioId::EmptyFeed, setup)?;

        let failure = if run.engine.card_count() != 0 {
            Some(format!("expected no cards, got {}", run.engine.card_count()))
        } else if !run.engine.renderer().transforms().is_empty() {
            Some("transforms written with an empty feed".to_string())
        } else if run.engine.renderer().fov_history().is_empty() {
            Some("camera fov never animated".to_string())
        } else {
            None
        };
        Ok((run, failure))
    }

    /// SIM-005: BrokenAssets - every texture load fails.
    ///
    /// **Assertion**: sharp layers fall back to placeholders, backdrops are
    /// hidden, and card positions match a run where every load succeeded.
    fn run_broken_assets(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-005: BrokenAssets");
        let script = || {
            GestureScript::wheel_flick(Duration::from_millis(100), 6, Duration::from_millis(30), -200.0)
                .merge(GestureScript::drag_throw(Duration::from_millis(1500), 200.0, 420.0, 8, Duration::from_millis(16)))
        };

        let mut broken = self.default_setup(script(), 3.0);
        broken.loader = SimAssetLoader::new(self.seed).with_failure_rate(1.0);
        let run = self.simulate(ScenarioId::BrokenAssets, broken)?;
        let healthy = self.simulate(ScenarioId::BrokenAssets, self.default_setup(script(), 3.0))?;

        let cards = run.engine.card_count();
        let renderer = run.engine.renderer();
        let placeholders = renderer.layers_where(|s| *s == LayerState::Placeholder);
        let hidden = renderer.layers_where(|s| *s == LayerState::Hidden);

        let failure = if placeholders != cards {
            Some(format!("{} placeholder layers for {} cards", placeholders, cards))
        } else if hidden != cards {
            Some(format!("{} hidden backdrops for {} cards", hidden, cards))
        } else if run.history != healthy.history {
            Some("scroll history differs from the healthy-asset run".to_string())
        } else if renderer.transforms().values().any(|t| t.scale.x != 1.0) {
            Some("a card was resized without a texture".to_string())
        } else {
            positions_differ(&run.engine, &healthy.engine)
        };
        Ok((run, failure))
    }

    /// SIM-006: FrameStall - multi-second gaps between frames.
    ///
    /// **Assertion**: every frame's dt is clamped, so no frame jumps.
    fn run_frame_stall(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-006: FrameStall");
        let context = SimContext::new(self.seed);
        let mut rng = context.rng_stream(6);

        let duration = self.max_duration_secs.max(5.0);
        let total_frames = (duration * self.fps as f64) as u64;
        let mut stalls = BTreeMap::new();
        let mut frame = self.fps as u64 * 2;
        while frame < total_frames {
            stalls.insert(frame, rng.gen_range(2.0..5.0));
            frame += self.fps as u64 * 2;
        }

        let mut script = GestureScript::new();
        for burst in 0..(duration as u64) {
            script = script.merge(GestureScript::wheel_flick(
                Duration::from_millis(burst * 1900 + 100),
                12,
                Duration::from_millis(10),
                180.0,
            ));
        }

        let mut setup = self.default_setup(script, duration);
        setup.stalls = stalls;
        let scheduled = setup.stalls.len();
        let run = self.simulate(ScenarioId::FrameStall, setup)?;

        let failure = if scheduled > 0 && run.metrics.stalls == 0 {
            Some(format!(
                "no clock gap exceeded the {:.3}s clamp",
                self.config.scroll.max_frame_dt
            ))
        } else if scheduled > 0 && run.time_secs < duration + 1.0 {
            Some("stalls did not advance the clock".to_string())
        } else {
            check_clamped_steps(&run, &self.config)
        };
        Ok((run, failure))
    }

    /// SIM-007: LongHaul - scrolls past the re-centering threshold.
    ///
    /// **Assertion**: the offset is folded back at least once and no card
    /// pops at the fold.
    fn run_long_haul(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-007: LongHaul");
        let duration = self.max_duration_secs.max(4.0);
        let mut script = GestureScript::new();
        let mut t = 100;
        while (t as f64) < duration * 1000.0 - 500.0 {
            script = script.merge(GestureScript::wheel_flick(Duration::from_millis(t), 10, Duration::from_millis(16), 240.0));
            t += 500;
        }

        let mut setup = self.default_setup(script, duration);
        setup.start = StartOffset::BeforeRecenter(1.5);
        let run = self.simulate(ScenarioId::LongHaul, setup)?;

        let threshold = run.engine.wrap().period_turns() * self.config.scroll.recenter_after_periods;
        let failure = if run.metrics.recenters == 0 {
            Some("offset never re-centered".to_string())
        } else if run.engine.scroll_state().offset.abs() > threshold {
            Some(format!("offset {:.1} still beyond threshold", run.engine.scroll_state().offset))
        } else {
            None
        };
        Ok((run, failure))
    }

    /// SIM-008: IdleSettle - no input at all.
    ///
    /// **Assertion**: offset stays at zero and the fov is never pushed.
    fn run_idle_settle(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-008: IdleSettle");
        let run = self.simulate(ScenarioId::IdleSettle, self.default_setup(GestureScript::new(), 2.0))?;

        let failure = if run.history.iter().any(|s| s.state != ScrollState::default()) {
            Some("scroll state changed without input".to_string())
        } else if !run.engine.renderer().fov_history().is_empty() {
            Some("fov pushed while idle".to_string())
        } else if run.engine.renderer().frames() != run.frames {
            Some("renderer missed frames".to_string())
        } else {
            None
        };
        Ok((run, failure))
    }

    /// SIM-009: RandomSession - seeded mix of every gesture, flaky assets.
    ///
    /// **Assertion**: every per-frame invariant holds.
    fn run_random_session(&self) -> Result<(SimRun, Option<String>), String> {
        info!("SIM-009: RandomSession");
        let context = SimContext::new(self.seed);
        let mut rng = context.rng_stream(9);
        let duration = self.max_duration_secs.max(1.0);
        let script = GestureScript::random_session(&mut rng, Duration::from_secs_f64(duration));

        let mut setup = self.default_setup(script, duration);
        setup.loader = SimAssetLoader::new(self.seed).with_failure_rate(0.2);
        let run = self.simulate(ScenarioId::RandomSession, setup)?;
        Ok((run, None))
    }

    // ========== Simulation Loop ==========

    fn default_setup(&self, script: GestureScript, min_duration: f64) -> SimSetup {
        SimSetup {
            feed: SimFeedSource::with_cards(self.cards),
            loader: SimAssetLoader::new(self.seed),
            script,
            stalls: BTreeMap::new(),
            duration_secs: self.max_duration_secs.max(min_duration),
            start: StartOffset::Zero,
        }
    }

    fn simulate(&self, scenario: ScenarioId, setup: SimSetup) -> Result<SimRun, String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| format!("failed to start runtime: {}", e))?;
        runtime.block_on(self.simulate_async(scenario, setup))
    }

    async fn simulate_async(&self, scenario: ScenarioId, setup: SimSetup) -> Result<SimRun, String> {
        let SimSetup {
            feed,
            loader,
            mut script,
            stalls,
            duration_secs,
            start,
        } = setup;

        let context = SimContext::shared(self.seed);
        let appearance: Box<dyn CardAppearance> = Box::new(LayeredGlass::default());
        let mut engine = TrainEngine::new(context.clone(), RecordingRenderer::new(), self.config.clone(), appearance)
            .map_err(|e| format!("invalid configuration: {}", e))?;

        let loader = Arc::new(loader);
        engine.init_from_feed(&feed, &loader).await;

        if let StartOffset::BeforeRecenter(turns) = start {
            let threshold = engine.wrap().period_turns() * self.config.scroll.recenter_after_periods;
            engine.set_scroll_state(ScrollState {
                offset: threshold - turns,
                ..Default::default()
            });
        }

        let logger = if self.visualize {
            RerunLogger::new("cardtrain-sim")
        } else {
            RerunLogger::disabled()
        };
        if logger.is_enabled() {
            let wrap = *engine.wrap();
            let rail = engine.rail();
            logger.log_rail(
                rail.base + rail.direction * wrap.s_start,
                rail.base + rail.direction * (wrap.s_start + wrap.s_total),
            );
        }

        let (tx, mut queue) = InputQueue::channel();
        let mut checker = InvariantChecker::new(&self.config.camera);
        let mut metrics = ScenarioMetrics::default();
        let mut history = Vec::new();
        let mut export = SimExport::new(scenario.name(), self.seed, engine.card_count());

        let frame_dt = 1.0 / self.fps as f64;
        let total_frames = (duration_secs * self.fps as f64).round() as u64;
        let export_stride = (self.fps as u64 / 10).max(1);

        for frame in 0..total_frames {
            let raw_dt = if frame > 0 {
                let gap = stalls.get(&frame).copied().unwrap_or(frame_dt);
                context.advance_time(Duration::from_secs_f64(gap));
                gap
            } else {
                0.0
            };
            if raw_dt > self.config.scroll.max_frame_dt {
                metrics.stalls += 1;
            }
            let now = context.now();

            for (at, event) in script.due(now) {
                tx.send(at, event);
                metrics.input_events += 1;
            }
            engine.drain_inputs(&mut queue);

            // Let finished loads report back before the frame drains them
            tokio::task::yield_now().await;

            let report = engine.frame();
            checker.check(&report, engine.items(), engine.wrap(), engine.renderer().last_frame_writes());
            metrics.record(&report);

            let time_sec = now.as_secs_f64();
            if frame % export_stride == 0 || report.recentered {
                export.add_frame(SimFrame::from_report(time_sec, &report, engine.items()));
            }

            if logger.is_enabled() {
                logger.set_time(time_sec);
                let cards: Vec<_> = report
                    .placements
                    .iter()
                    .zip(engine.items())
                    .map(|(p, item)| (item.index, p.position))
                    .collect();
                logger.log_cards(&cards);
                logger.log_scroll(report.state.offset, report.state.velocity, report.state.activity, report.fov);
                if report.recentered {
                    logger.log_event("events", "offset re-centered");
                }
            }

            if frame % self.fps as u64 == 0 {
                debug!(
                    "  t={:.1}s | offset={:.3} | v={:.3} | activity={:.2} | fov={:.3}",
                    time_sec, report.state.offset, report.state.velocity, report.state.activity, report.fov
                );
            }

            history.push(FrameSample {
                time_sec,
                raw_dt,
                dt: report.dt,
                state: report.state,
                fov: report.fov,
                dragging: engine.is_dragging(),
            });
        }

        let (loaded, failed) = engine.asset_counts();
        metrics.assets_loaded = loaded;
        metrics.assets_failed = failed;
        metrics.max_discontinuity = checker.max_discontinuity();

        Ok(SimRun {
            frames: total_frames,
            time_secs: context.now().as_secs_f64(),
            engine,
            checker,
            metrics,
            history,
            export,
        })
    }

    fn finish(&self, scenario: ScenarioId, mut run: SimRun, failure: Option<String>) -> (ScenarioResult, SimExport) {
        let failure = match run.checker.first_failure() {
            Some(first) => Some(format!(
                "{} invariant violation(s), first: {}",
                run.checker.violations().len(),
                first
            )),
            None => failure,
        };
        let passed = failure.is_none();
        run.export.finalize(passed, failure.clone());

        let result = ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_frames: run.frames,
            final_time_secs: run.time_secs,
            card_count: run.engine.card_count(),
            final_offset: run.engine.scroll_state().offset,
            failure_reason: failure,
            metrics: run.metrics,
        };
        (result, run.export)
    }
}

/// Checks that no frame integrated more than the dt clamp allows.
///
/// The offset step of a frame is `v * dt` with `v` the velocity before
/// decay, so it is bounded by the post-decay velocity grown back over one
/// clamped frame.
fn check_clamped_steps(run: &SimRun, config: &TrainConfig) -> Option<String> {
    let max_dt = config.scroll.max_frame_dt;
    let regrowth = (max_dt / config.scroll.velocity_tau).exp();

    for pair in run.history.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.dt > max_dt + 1e-12 {
            return Some(format!(
                "t={:.3}s: frame integrated {:.3}s (gap {:.3}s, clamp {:.3}s)",
                cur.time_sec, cur.dt, cur.raw_dt, max_dt
            ));
        }
        let step = (cur.state.offset - prev.state.offset).abs();
        let bound = cur.state.velocity.abs() * regrowth * max_dt;
        if step > bound * (1.0 + 1e-9) + 1e-12 {
            return Some(format!(
                "t={:.3}s: offset moved {:.4} turns in one frame, clamp allows {:.4}",
                cur.time_sec, step, bound
            ));
        }
    }
    None
}

/// Checks a drag or swipe of `turns` total: never past `turns` while held,
/// then carried a little further by the release kick.
fn check_throw(run: &SimRun, turns: f64) -> Option<String> {
    let held: Vec<&FrameSample> = run.history.iter().filter(|s| s.dragging).collect();
    if held.is_empty() {
        return Some("drag never registered".to_string());
    }
    let Some(last) = run.history.last() else {
        return Some("no frames rendered".to_string());
    };

    let overshoot = held
        .iter()
        .map(|s| s.state.offset.abs() - turns.abs())
        .fold(f64::MIN, f64::max);

    if overshoot > 1e-9 {
        Some(format!("offset passed {:.1} while the drag was held", turns))
    } else if last.state.offset.signum() != turns.signum() || last.state.offset.abs() <= turns.abs() {
        Some(format!("release did not carry the throw (final offset {:.4})", last.state.offset))
    } else if (last.state.offset - turns).abs() > turns.abs() * 0.1 {
        Some(format!("throw overshot to {:.4}", last.state.offset))
    } else if run.metrics.peak_activity < 0.5 {
        Some(format!("activity peaked at {:.2} during drag", run.metrics.peak_activity))
    } else {
        None
    }
}

/// Compares the latest card positions of two engines.
fn positions_differ(a: &SimEngine, b: &SimEngine) -> Option<String> {
    for (pa, pb) in a.current_layout().iter().zip(b.current_layout().iter()) {
        if pa.position != pb.position {
            return Some(format!(
                "card panel {} at {:?}, healthy run has {:?}",
                pa.visual, pa.position, pb.position
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_builder() {
        let runner = ScenarioRunner::new(7, 5).with_fps(30).with_duration(1.5);
        assert_eq!(runner.fps, 30);
        assert_eq!(runner.max_duration_secs, 1.5);
        assert_eq!(runner.cards, 5);
    }

    #[test]
    fn test_idle_settle_passes() {
        let result = ScenarioRunner::new(1, 4).with_duration(1.0).run(ScenarioId::IdleSettle);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.total_frames, 120);
    }

    #[test]
    fn test_frame_stall_counts_real_gaps() {
        let result = ScenarioRunner::new(4, 6).with_duration(5.0).run(ScenarioId::FrameStall);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.stalls, 2);
        assert!(result.metrics.max_dt <= 0.05 + 1e-12);
    }

    #[test]
    fn test_frame_stall_fails_when_gaps_fit_the_clamp() {
        let mut config = TrainConfig::default();
        config.scroll.max_frame_dt = 10.0;
        let result = ScenarioRunner::new(4, 6)
            .with_duration(5.0)
            .with_config(config)
            .run(ScenarioId::FrameStall);

        assert!(!result.passed);
        assert_eq!(result.metrics.stalls, 0);
        assert!(result.failure_reason.unwrap().contains("no clock gap exceeded"));
    }

    #[tokio::test]
    async fn test_first_frame_after_populate_writes_each_card_once() {
        let config = TrainConfig::default();
        let mut engine = TrainEngine::new(
            SimContext::shared(3),
            RecordingRenderer::new(),
            config.clone(),
            Box::new(LayeredGlass::default()),
        )
        .unwrap();
        let loader = Arc::new(SimAssetLoader::new(3));
        assert_eq!(engine.init_from_feed(&SimFeedSource::with_cards(12), &loader).await, 12);

        let mut checker = InvariantChecker::new(&config.camera);
        let report = engine.frame();
        let written = engine.renderer().last_frame_writes();
        checker.check(&report, engine.items(), engine.wrap(), written);

        assert_eq!(written, 12);
        assert!(checker.is_clean(), "{:?}", checker.first_failure());
    }

    #[test]
    fn test_invalid_config_fails_cleanly() {
        let mut config = TrainConfig::default();
        config.rail.step = nalgebra::Vector3::zeros();
        let result = ScenarioRunner::new(1, 4).with_config(config).run(ScenarioId::IdleSettle);
        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("invalid configuration"));
    }
}
