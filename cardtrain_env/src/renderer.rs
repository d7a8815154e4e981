//! Renderer capability interface consumed by the engine.

use crate::types::ImageInfo;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Opaque handle to a panel owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PanelHandle(pub u64);

impl std::fmt::Display for PanelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// What a layer inside a card panel is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerRole {
    /// Soft background copy of the image, slightly behind the card
    Blur,
    /// The card image itself
    Sharp,
    /// Untextured front plate
    Glass,
}

/// Visual state of a single layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LayerState {
    /// Created, no texture yet (or the texture failed to load)
    Placeholder,
    /// Texture attached
    Textured(ImageInfo),
    /// Not drawn
    Hidden,
}

/// Description of one flat layer inside a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDesc {
    pub role: LayerRole,

    /// Offset along the panel normal (positive = towards the camera)
    pub depth_offset: f64,

    /// Opacity in [0, 1]
    pub opacity: f64,

    /// Whether the layer writes to the depth buffer
    pub depth_write: bool,

    /// Texture URL, if the layer expects one
    pub source: Option<String>,
}

/// Description of a flat rectangular visual unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDesc {
    /// Layers, back to front
    pub layers: Vec<LayerDesc>,

    /// Draw order hint (cards use their index)
    pub render_order: i32,
}

/// Placement of a panel in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelTransform {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl PanelTransform {
    /// Transform at `position` with identity rotation and unit scale.
    pub fn at(position: Vector3<f64>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Perspective camera setup, applied once when the engine starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    /// Vertical field of view in degrees
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vector3<f64>,
    pub look_at: Vector3<f64>,
}

/// Abstraction over the 3D scene graph.
///
/// # Implementations
///
/// - **Production**: a GPU scene graph owned by the host
/// - **Simulation**: `RecordingRenderer`, which only records calls
///
/// The engine calls these from its single frame thread; implementations
/// do not need to be `Send`.
pub trait Renderer {
    /// Creates a panel and returns its handle.
    fn create_panel(&mut self, desc: &PanelDesc) -> PanelHandle;

    /// Sets a panel's position, orientation and scale.
    fn set_transform(&mut self, panel: PanelHandle, transform: &PanelTransform);

    /// Updates the state of one layer of a panel.
    ///
    /// `layer` indexes into the `PanelDesc::layers` the panel was created with.
    fn set_layer_state(&mut self, panel: PanelHandle, layer: usize, state: LayerState);

    /// Applies the initial camera setup.
    fn configure_camera(&mut self, camera: &CameraDesc);

    /// Sets the camera's vertical field of view in degrees.
    fn set_camera_fov(&mut self, fov_deg: f64);

    /// Draws one frame.
    fn render_frame(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_at_defaults() {
        let t = PanelTransform::at(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(t.orientation, UnitQuaternion::identity());
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(PanelHandle(7).to_string(), "panel#7");
    }
}
