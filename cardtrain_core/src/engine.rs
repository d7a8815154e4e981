//! Engine Runtime - drives the scroll pipeline once per frame.
//!
//! This module is the integration layer between the pure engines (scroll,
//! activity, zoom, layout) and the environment seams (clock, renderer,
//! asset loader).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        TrainEngine                           │
//! │                                                              │
//! │  InputEvent ──► InputSampler ──► ScrollState (offset, v)     │
//! │                      │                 │                     │
//! │                      ▼                 ▼                     │
//! │               ActivitySignals ──► FramePhysics::step         │
//! │                                        │                     │
//! │                     ┌──────────────────┴───────┐             │
//! │                     ▼                          ▼             │
//! │             ZoomController              layout::layout       │
//! │                     │                          │             │
//! │                     ▼                          ▼             │
//! │            Renderer::set_camera_fov   Renderer::set_transform│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cardtrain_core::{InputQueue, TrainEngine, TrainConfig, LayeredGlass};
//! use cardtrain_env::{TokioContext, FileFeedSource};
//!
//! let ctx = TokioContext::shared();
//! let mut engine = TrainEngine::new(ctx, renderer, TrainConfig::default(), Box::new(LayeredGlass::default()))?;
//! engine.init_from_feed(&FileFeedSource::new("cards.json"), &loader).await;
//! let (input_tx, mut inputs) = InputQueue::channel();
//! // hand `input_tx` to the windowing thread
//! engine.run(&mut inputs, Duration::from_millis(16), shutdown_rx).await;
//! ```

use crate::activity::{ActivityEstimator, ActivitySignals};
use crate::appearance::CardAppearance;
use crate::assets::{AssetEvent, AssetPipeline};
use crate::config::TrainConfig;
use crate::error::ConfigError;
use crate::feed::load_feed_or_empty;
use crate::input::{InputEvent, InputQueue, InputSampler};
use crate::layout::{layout, CardItem, CardPlacement, WrapParams};
use crate::rail::Rail;
use crate::scroll::{sanitize_dt, ScrollIntegrator, ScrollState};
use crate::zoom::ZoomController;

use cardtrain_env::{
    AssetLoader, CameraDesc, CardDescriptor, FeedSource, PanelHandle, PanelTransform, Renderer,
    TrainContext,
};
use nalgebra::Vector3;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// The pure per-frame physics: integration followed by activity smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePhysics {
    pub integrator: ScrollIntegrator,
    pub estimator: ActivityEstimator,
    pub zoom: ZoomController,
    pub recenter_after_periods: f64,
}

impl FramePhysics {
    pub fn from_config(config: &TrainConfig) -> Self {
        Self {
            integrator: ScrollIntegrator::from_config(&config.scroll),
            estimator: ActivityEstimator::from_config(&config.activity),
            zoom: ZoomController::from_config(&config.camera),
            recenter_after_periods: config.scroll.recenter_after_periods,
        }
    }

    /// Advances `state` by one frame. No side effects.
    pub fn step(&self, state: ScrollState, signals: &ActivitySignals, dt: f64) -> ScrollState {
        let dt = sanitize_dt(dt, self.integrator.max_frame_dt);
        let state = self.integrator.integrate(state, dt);
        self.estimator.update(state, signals, dt)
    }
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Frame number (1-based)
    pub frame: u64,

    /// Sanitized frame delta in seconds
    pub dt: f64,

    /// Scroll state after the frame
    pub state: ScrollState,

    /// Camera fov after the frame
    pub fov: f64,

    /// Whether the fov was pushed to the renderer this frame
    pub fov_changed: bool,

    /// Whether the offset was folded back into one period this frame
    pub recentered: bool,

    /// Card placements sent to the renderer
    pub placements: Vec<CardPlacement>,

    /// Texture results applied this frame
    pub assets_applied: usize,
}

/// The card train: one instance per view.
///
/// Generic over the context and renderer implementations, allowing the same
/// engine to run against a real host or the simulation harness.
pub struct TrainEngine<Ctx, R>
where
    Ctx: TrainContext,
    R: Renderer,
{
    /// Environment context
    context: Arc<Ctx>,

    /// Scene graph
    renderer: R,

    /// Configuration (validated)
    config: TrainConfig,

    rail: Rail,
    physics: FramePhysics,
    appearance: Box<dyn CardAppearance>,
    sampler: InputSampler,
    state: ScrollState,

    /// Cards, in feed order
    items: Vec<CardItem>,

    /// Per-card scale (aspect ratio once the image is known)
    scales: Vec<Vector3<f64>>,

    wrap: WrapParams,
    populated: bool,
    assets: AssetPipeline,

    /// Fov currently applied to the camera
    camera_fov: f64,

    last_frame_at: Option<Duration>,
    frame_count: u64,
}

impl<Ctx, R> TrainEngine<Ctx, R>
where
    Ctx: TrainContext,
    R: Renderer,
{
    /// Creates an engine with no cards and sets up the camera.
    ///
    /// Fails only on invalid configuration (e.g. a zero step vector).
    pub fn new(
        context: Arc<Ctx>,
        mut renderer: R,
        config: TrainConfig,
        appearance: Box<dyn CardAppearance>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rail = Rail::from_config(&config.rail)?;
        let physics = FramePhysics::from_config(&config);
        let wrap = WrapParams::compute(&[], rail.step_length, config.rail.wrap_repeats);

        let camera_fov = config.camera.base_fov_deg;
        renderer.configure_camera(&CameraDesc {
            fov_deg: camera_fov,
            near: config.camera.near,
            far: config.camera.far,
            position: Vector3::zeros(),
            look_at: Vector3::new(0.0, 0.0, -1.0),
        });

        debug!(
            step_length = rail.step_length,
            wrap_repeats = config.rail.wrap_repeats,
            appearance = appearance.name(),
            seed = context.seed(),
            "train engine created"
        );

        Ok(Self {
            context,
            renderer,
            sampler: InputSampler::new(&config.scroll),
            config,
            rail,
            physics,
            appearance,
            state: ScrollState::default(),
            items: Vec::new(),
            scales: Vec::new(),
            wrap,
            populated: false,
            assets: AssetPipeline::new(),
            camera_fov,
            last_frame_at: None,
            frame_count: 0,
        })
    }

    /// Loads the card feed (empty on failure) and populates the rail.
    pub async fn init_from_feed<F, L>(&mut self, feed: &F, loader: &Arc<L>) -> usize
    where
        F: FeedSource + ?Sized,
        L: AssetLoader,
    {
        let cards = load_feed_or_empty(feed).await;
        self.populate(&cards, loader)
    }

    /// Builds one card per descriptor and computes the wrap window.
    ///
    /// Runs once per engine; later calls are ignored. Texture loads are
    /// spawned in the background and do not affect placement. Returns the
    /// number of cards on the rail.
    pub fn populate<L: AssetLoader>(&mut self, cards: &[CardDescriptor], loader: &Arc<L>) -> usize {
        if self.populated {
            warn!(existing = self.items.len(), "cards already populated, ignoring new feed");
            return self.items.len();
        }
        self.populated = true;

        let eps_z = self.config.rail.eps_along;
        let mut requested = 0;

        for (index, card) in cards.iter().enumerate() {
            let visual = self
                .appearance
                .build_visual(&mut self.renderer, card.url(), index);
            for request in &visual.requests {
                self.assets
                    .request(self.context.as_ref(), loader, index, request);
                requested += 1;
            }
            if card.url().is_none() {
                warn!(card = index, "card has no image URL, keeping an empty slot");
            }

            let item = CardItem::new(&self.rail, index, visual.panel, eps_z);
            let transform = PanelTransform {
                position: item.initial_position(&self.rail),
                orientation: self.rail.orientation,
                scale: Vector3::new(1.0, 1.0, 1.0),
            };
            self.renderer.set_transform(item.visual, &transform);

            self.items.push(item);
            self.scales.push(transform.scale);
        }

        self.wrap = WrapParams::compute(&self.items, self.rail.step_length, self.config.rail.wrap_repeats);

        info!(
            cards = self.items.len(),
            textures = requested,
            s_start = self.wrap.s_start,
            s_total = self.wrap.s_total,
            "rail populated"
        );
        self.items.len()
    }

    /// Applies one input event at the context's current time.
    pub fn handle_input(&mut self, event: &InputEvent) {
        let now = self.context.now();
        self.sampler.apply(event, now, &mut self.state);
    }

    /// Applies every queued input event. Returns how many were applied.
    pub fn drain_inputs(&mut self, queue: &mut InputQueue) -> usize {
        let events = queue.drain();
        for (at, event) in &events {
            self.sampler.apply(event, *at, &mut self.state);
        }
        events.len()
    }

    /// Renders one frame using the context clock for `dt`.
    ///
    /// The first frame has `dt = 0`.
    pub fn frame(&mut self) -> FrameReport {
        let now = self.context.now();
        let dt = match self.last_frame_at {
            Some(last) => now.saturating_sub(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_frame_at = Some(now);
        self.tick(dt)
    }

    /// Renders one frame of length `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> FrameReport {
        let assets_applied = self.apply_asset_results();

        let now = self.context.now();
        let signals = self.sampler.signals(now);
        let dt = sanitize_dt(dt, self.physics.integrator.max_frame_dt);
        self.state = self.physics.step(self.state, &signals, dt);

        let recentered = ScrollIntegrator::recenter(
            &mut self.state,
            self.wrap.period_turns(),
            self.physics.recenter_after_periods,
        );
        if recentered {
            debug!(offset = self.state.offset, period = self.wrap.period_turns(), "scroll offset re-centered");
        }

        let fov_changed = match self.physics.zoom.update(self.camera_fov, self.state.activity) {
            Some(fov) => {
                self.renderer.set_camera_fov(fov);
                self.camera_fov = fov;
                true
            }
            None => false,
        };

        let placements = layout(&self.rail, &self.wrap, &self.items, self.state.offset);
        for (placement, scale) in placements.iter().zip(&self.scales) {
            self.renderer.set_transform(
                placement.visual,
                &PanelTransform {
                    position: placement.position,
                    orientation: self.rail.orientation,
                    scale: *scale,
                },
            );
        }
        self.renderer.render_frame();
        self.frame_count += 1;

        trace!(
            frame = self.frame_count,
            dt,
            offset = self.state.offset,
            velocity = self.state.velocity,
            activity = self.state.activity,
            "frame"
        );

        FrameReport {
            frame: self.frame_count,
            dt,
            state: self.state,
            fov: self.camera_fov,
            fov_changed,
            recentered,
            placements,
            assets_applied,
        }
    }

    /// Runs the frame loop until `shutdown` becomes true.
    ///
    /// Input arrives through `inputs`, drained before every frame.
    pub async fn run(
        &mut self,
        inputs: &mut InputQueue,
        frame_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(interval_ms = frame_interval.as_millis() as u64, "frame loop started");
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            self.drain_inputs(inputs);
            self.frame();
            self.context.sleep(frame_interval).await;
        }
        info!(frames = self.frame_count, "frame loop stopped");
    }

    // ========== Accessors ==========

    /// Current scroll state.
    pub fn scroll_state(&self) -> ScrollState {
        self.state
    }

    /// Replaces the scroll state (e.g. to start a view mid-rail).
    pub fn set_scroll_state(&mut self, state: ScrollState) {
        self.state = state;
    }

    /// Placements for the current state, without rendering.
    pub fn current_layout(&self) -> Vec<CardPlacement> {
        layout(&self.rail, &self.wrap, &self.items, self.state.offset)
    }

    pub fn items(&self) -> &[CardItem] {
        &self.items
    }

    pub fn card_count(&self) -> usize {
        self.items.len()
    }

    pub fn wrap(&self) -> &WrapParams {
        &self.wrap
    }

    pub fn rail(&self) -> &Rail {
        &self.rail
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn physics(&self) -> &FramePhysics {
        &self.physics
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn context(&self) -> &Arc<Ctx> {
        &self.context
    }

    pub fn camera_fov(&self) -> f64 {
        self.camera_fov
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_dragging(&self) -> bool {
        self.sampler.is_dragging()
    }

    /// Scale currently applied to a card.
    pub fn card_scale(&self, index: usize) -> Option<Vector3<f64>> {
        self.scales.get(index).copied()
    }

    /// Texture loads still in flight.
    pub fn pending_assets(&self) -> usize {
        self.assets.pending()
    }

    /// (loaded, failed) texture counts so far.
    pub fn asset_counts(&self) -> (usize, usize) {
        (self.assets.loaded(), self.assets.failed())
    }

    pub fn panel_of(&self, index: usize) -> Option<PanelHandle> {
        self.items.get(index).map(|it| it.visual)
    }

    // ========== Private Helper Methods ==========

    fn apply_asset_results(&mut self) -> usize {
        let events = self.assets.drain();
        let count = events.len();
        for event in events {
            self.apply_asset(event);
        }
        count
    }

    fn apply_asset(&mut self, event: AssetEvent) {
        let Some(item) = self.items.get(event.card) else {
            warn!(card = event.card, "texture result for unknown card");
            return;
        };

        let outcome = self.appearance.on_asset(event.role, &event.result);
        self.renderer
            .set_layer_state(item.visual, event.layer, outcome.layer_state);

        if let Some(aspect) = outcome.aspect {
            self.scales[event.card] = Vector3::new(aspect, 1.0, 1.0);
        }

        match &event.result {
            Ok(info) => debug!(card = event.card, role = ?event.role, width = info.width, height = info.height, "texture ready"),
            Err(e) => warn!(card = event.card, role = ?event.role, url = %event.url, error = %e, "texture failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::{FlatCard, LayeredGlass};
    use crate::input::PointerButton;
    use approx::assert_relative_eq;
    use async_trait::async_trait;
    use cardtrain_env::{EnvError, ImageInfo, LayerState, PanelDesc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Context with a hand-driven clock.
    struct ManualClock {
        now: Mutex<Duration>,
    }

    impl ManualClock {
        fn shared() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Duration::ZERO),
            })
        }

        fn advance(&self, d: Duration) {
            *self.now.lock().unwrap() += d;
        }
    }

    #[async_trait]
    impl TrainContext for ManualClock {
        fn now(&self) -> Duration {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.advance(duration);
            tokio::task::yield_now().await;
        }

        fn spawn<F>(&self, _name: &str, future: F)
        where
            F: std::future::Future<Output = ()> + Send + 'static,
        {
            tokio::spawn(future);
        }

        fn seed(&self) -> u64 {
            0
        }
    }

    #[derive(Default)]
    struct TestRenderer {
        panels: usize,
        transforms: HashMap<PanelHandle, PanelTransform>,
        layer_states: HashMap<(PanelHandle, usize), LayerState>,
        fov_calls: Vec<f64>,
        camera: Option<CameraDesc>,
        frames: u64,
    }

    impl Renderer for TestRenderer {
        fn create_panel(&mut self, _desc: &PanelDesc) -> PanelHandle {
            self.panels += 1;
            PanelHandle(self.panels as u64)
        }
        fn set_transform(&mut self, panel: PanelHandle, transform: &PanelTransform) {
            self.transforms.insert(panel, *transform);
        }
        fn set_layer_state(&mut self, panel: PanelHandle, layer: usize, state: LayerState) {
            self.layer_states.insert((panel, layer), state);
        }
        fn configure_camera(&mut self, camera: &CameraDesc) {
            self.camera = Some(*camera);
        }
        fn set_camera_fov(&mut self, fov_deg: f64) {
            self.fov_calls.push(fov_deg);
        }
        fn render_frame(&mut self) {
            self.frames += 1;
        }
    }

    struct Loader {
        fail: bool,
    }

    #[async_trait]
    impl AssetLoader for Loader {
        async fn load_image(&self, url: &str) -> Result<ImageInfo, EnvError> {
            if self.fail {
                Err(EnvError::asset(url, "unreachable"))
            } else {
                Ok(ImageInfo::new(300, 200))
            }
        }
    }

    fn engine(clock: &Arc<ManualClock>) -> TrainEngine<ManualClock, TestRenderer> {
        TrainEngine::new(
            clock.clone(),
            TestRenderer::default(),
            TrainConfig::default(),
            Box::new(LayeredGlass::default()),
        )
        .unwrap()
    }

    fn cards(n: usize) -> Vec<CardDescriptor> {
        (0..n).map(|i| CardDescriptor::new(format!("cards/{:02}.jpg", i))).collect()
    }

    async fn settle_assets(engine: &mut TrainEngine<ManualClock, TestRenderer>) {
        for _ in 0..200 {
            if engine.pending_assets() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
            engine.tick(0.0);
        }
    }

    #[test]
    fn test_zero_step_is_fatal() {
        let mut config = TrainConfig::default();
        config.rail.step = Vector3::zeros();
        let result = TrainEngine::new(
            ManualClock::shared(),
            TestRenderer::default(),
            config,
            Box::new(FlatCard),
        );
        assert!(matches!(result, Err(ConfigError::ZeroStep)));
    }

    #[test]
    fn test_camera_configured_on_creation() {
        let clock = ManualClock::shared();
        let engine = engine(&clock);
        let camera = engine.renderer().camera.unwrap();
        assert_eq!(camera.fov_deg, 5.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.look_at, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_zero_cards_still_animates_fov() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        engine.populate(&[], &Arc::new(Loader { fail: false }));

        engine.handle_input(&InputEvent::Wheel { delta_y: 120.0 });
        let mut fov = engine.camera_fov();
        for _ in 0..10 {
            clock.advance(Duration::from_millis(16));
            let report = engine.frame();
            assert!(report.placements.is_empty());
            fov = report.fov;
        }

        assert!(fov > 5.0);
        assert!(engine.renderer().transforms.is_empty());
        assert_eq!(engine.renderer().frames, 10);
    }

    #[test]
    fn test_idle_frames_do_not_touch_fov() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        for _ in 0..30 {
            clock.advance(Duration::from_millis(16));
            engine.frame();
        }
        assert!(engine.renderer().fov_calls.is_empty());
    }

    #[tokio::test]
    async fn test_initial_placement_is_unwrapped() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        engine.populate(&cards(4), &Arc::new(Loader { fail: false }));

        for item in engine.items() {
            let t = engine.renderer().transforms[&item.visual];
            assert_relative_eq!(t.position, item.initial_position(engine.rail()), epsilon = 1e-12);
            assert_eq!(t.orientation, engine.rail().orientation);
        }
    }

    #[tokio::test]
    async fn test_second_populate_is_ignored() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        let loader = Arc::new(Loader { fail: false });
        assert_eq!(engine.populate(&cards(3), &loader), 3);
        assert_eq!(engine.populate(&cards(7), &loader), 3);
        assert_eq!(engine.card_count(), 3);
    }

    #[tokio::test]
    async fn test_positions_do_not_depend_on_assets() {
        let good_clock = ManualClock::shared();
        let bad_clock = ManualClock::shared();
        let mut good = engine(&good_clock);
        let mut bad = engine(&bad_clock);
        good.populate(&cards(6), &Arc::new(Loader { fail: false }));
        bad.populate(&cards(6), &Arc::new(Loader { fail: true }));
        settle_assets(&mut good).await;
        settle_assets(&mut bad).await;

        for e in [&mut good, &mut bad] {
            e.handle_input(&InputEvent::Wheel { delta_y: 300.0 });
        }
        for _ in 0..20 {
            let a = good.tick(1.0 / 60.0);
            let b = bad.tick(1.0 / 60.0);
            for (pa, pb) in a.placements.iter().zip(&b.placements) {
                assert_eq!(pa.position, pb.position);
            }
        }

        // Good engine picked up the aspect ratio, bad one kept unit scale
        assert_relative_eq!(good.card_scale(0).unwrap().x, 1.5);
        assert_eq!(bad.card_scale(0).unwrap(), Vector3::new(1.0, 1.0, 1.0));
        let panel = bad.panel_of(0).unwrap();
        assert_eq!(
            bad.renderer().layer_states[&(panel, LayeredGlass::BLUR_LAYER)],
            LayerState::Hidden
        );
        assert_eq!(
            bad.renderer().layer_states[&(panel, LayeredGlass::SHARP_LAYER)],
            LayerState::Placeholder
        );
        assert_eq!(bad.asset_counts(), (0, 12));
    }

    #[test]
    fn test_drag_moves_offset_by_exact_turns() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);

        engine.handle_input(&InputEvent::PointerDown {
            y: 400.0,
            button: PointerButton::Primary,
        });
        for y in [390.0, 370.0, 345.0, 300.0] {
            engine.handle_input(&InputEvent::PointerMove { y });
        }

        assert_relative_eq!(engine.scroll_state().offset, -1.0, epsilon = 1e-9);
        assert!(engine.is_dragging());

        clock.advance(Duration::from_millis(16));
        let report = engine.tick(0.016);
        assert!(report.state.activity > 0.0, "dragging raises activity");
    }

    #[test]
    fn test_recenter_keeps_layout() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        let handles: Vec<CardDescriptor> = (0..5).map(|_| CardDescriptor::empty()).collect();
        engine.populate(&handles, &Arc::new(Loader { fail: false }));

        let period = engine.wrap().period_turns();
        let far = period * 5000.0 + 3.25;
        engine.set_scroll_state(ScrollState {
            offset: far,
            ..Default::default()
        });
        let before = engine.current_layout();

        let report = engine.tick(0.0);

        assert!(report.recentered);
        assert!(report.state.offset.abs() < period);
        for (a, b) in before.iter().zip(&report.placements) {
            assert_relative_eq!(a.position, b.position, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_queued_inputs_apply_on_drain() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        let (tx, mut queue) = InputQueue::channel();

        tx.send(Duration::from_millis(1), InputEvent::Wheel { delta_y: 50.0 });
        tx.send(Duration::from_millis(2), InputEvent::Wheel { delta_y: 50.0 });
        assert_eq!(engine.scroll_state().velocity, 0.0);

        assert_eq!(engine.drain_inputs(&mut queue), 2);
        assert_relative_eq!(engine.scroll_state().velocity, 0.2, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        let (tx, rx) = watch::channel(true);
        let (_input_tx, mut inputs) = InputQueue::channel();

        engine.run(&mut inputs, Duration::from_millis(16), rx).await;
        assert_eq!(engine.frame_count(), 0);
        drop(tx);
    }

    #[tokio::test]
    async fn test_run_applies_input_sent_while_running() {
        let clock = ManualClock::shared();
        let mut engine = engine(&clock);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (input_tx, mut inputs) = InputQueue::channel();

        let host_clock = clock.clone();
        tokio::spawn(async move {
            while host_clock.now() < Duration::from_millis(100) {
                tokio::task::yield_now().await;
            }
            input_tx.send(host_clock.now(), InputEvent::Wheel { delta_y: 100.0 });
            while host_clock.now() < Duration::from_millis(500) {
                tokio::task::yield_now().await;
            }
            let _ = shutdown_tx.send(true);
        });

        engine.run(&mut inputs, Duration::from_millis(16), shutdown_rx).await;

        assert!(engine.frame_count() > 20);
        assert!(engine.scroll_state().offset > 0.0);
    }

    #[test]
    fn test_physics_step_zero_dt() {
        let physics = FramePhysics::from_config(&TrainConfig::default());
        let state = ScrollState {
            offset: 2.0,
            velocity: 0.5,
            activity: 0.25,
        };
        let next = physics.step(state, &ActivitySignals::default(), 0.0);
        assert_eq!(next, state);
    }
}
