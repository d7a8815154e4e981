//! A renderer that records what the engine asked it to draw.

use cardtrain_env::{CameraDesc, LayerState, PanelDesc, PanelHandle, PanelTransform, Renderer};
use std::collections::{BTreeMap, BTreeSet};

/// Scene-graph stand-in for simulation runs.
///
/// Keeps the latest transform per panel plus a history of camera fov
/// changes, so scenarios and the invariant checker can inspect every frame.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    /// Panel descriptions in creation order (handle = index)
    panels: Vec<PanelDesc>,

    /// Latest transform per panel
    transforms: BTreeMap<PanelHandle, PanelTransform>,

    /// Latest state per (panel, layer)
    layer_states: BTreeMap<(PanelHandle, usize), LayerState>,

    camera: Option<CameraDesc>,

    /// Every fov pushed by the engine
    fov_history: Vec<f64>,

    /// Panels written since the last rendered frame
    pending_writes: BTreeSet<PanelHandle>,

    /// Distinct panels written in the last rendered frame
    last_frame_writes: usize,

    frames: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel(&self, handle: PanelHandle) -> Option<&PanelDesc> {
        self.panels.get(handle.0 as usize)
    }

    pub fn transform(&self, handle: PanelHandle) -> Option<&PanelTransform> {
        self.transforms.get(&handle)
    }

    pub fn transforms(&self) -> &BTreeMap<PanelHandle, PanelTransform> {
        &self.transforms
    }

    pub fn layer_state(&self, handle: PanelHandle, layer: usize) -> Option<LayerState> {
        self.layer_states.get(&(handle, layer)).copied()
    }

    /// Count of layers currently in the given state.
    pub fn layers_where(&self, pred: impl Fn(&LayerState) -> bool) -> usize {
        self.layer_states.values().filter(|s| pred(s)).count()
    }

    pub fn camera(&self) -> Option<&CameraDesc> {
        self.camera.as_ref()
    }

    /// Fov the camera currently has (configured or last pushed).
    pub fn current_fov(&self) -> Option<f64> {
        self.fov_history
            .last()
            .copied()
            .or_else(|| self.camera.map(|c| c.fov_deg))
    }

    pub fn fov_history(&self) -> &[f64] {
        &self.fov_history
    }

    pub fn last_frame_writes(&self) -> usize {
        self.last_frame_writes
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for RecordingRenderer {
    fn create_panel(&mut self, desc: &PanelDesc) -> PanelHandle {
        let handle = PanelHandle(self.panels.len() as u64);
        self.panels.push(desc.clone());
        handle
    }

    fn set_transform(&mut self, panel: PanelHandle, transform: &PanelTransform) {
        self.transforms.insert(panel, *transform);
        self.pending_writes.insert(panel);
    }

    fn set_layer_state(&mut self, panel: PanelHandle, layer: usize, state: LayerState) {
        self.layer_states.insert((panel, layer), state);
    }

    fn configure_camera(&mut self, camera: &CameraDesc) {
        self.camera = Some(*camera);
    }

    fn set_camera_fov(&mut self, fov_deg: f64) {
        self.fov_history.push(fov_deg);
    }

    fn render_frame(&mut self) {
        self.last_frame_writes = self.pending_writes.len();
        self.pending_writes.clear();
        self.frames += 1;
    }
}
