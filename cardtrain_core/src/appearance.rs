//! Card appearance strategies (the Card Visual Factory).
//!
//! How a card looks is independent of where it goes. A strategy turns a URL
//! into a renderer panel plus the list of textures that panel wants; the
//! engine loads those and reports back through [`CardAppearance::on_asset`].

use cardtrain_env::{EnvError, ImageInfo, LayerDesc, LayerRole, LayerState, PanelDesc, PanelHandle, Renderer};

/// A texture a freshly built panel is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    /// Index into the panel's layers
    pub layer: usize,
    pub role: LayerRole,
    pub url: String,
}

/// A built card visual.
#[derive(Debug, Clone, PartialEq)]
pub struct CardVisual {
    pub panel: PanelHandle,
    pub requests: Vec<AssetRequest>,
}

/// What the engine should do after a texture load resolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetOutcome {
    /// New state for the layer
    pub layer_state: LayerState,

    /// New horizontal scale (width / height), if the card should be resized
    pub aspect: Option<f64>,
}

/// Pluggable look for a card.
pub trait CardAppearance: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Creates the panel for one card.
    ///
    /// `url` is `None` for feed entries without an image; the panel is still
    /// created so the card keeps its slot.
    fn build_visual(&self, renderer: &mut dyn Renderer, url: Option<&str>, index: usize) -> CardVisual;

    /// Maps a finished texture load onto layer state and card scale.
    fn on_asset(&self, role: LayerRole, result: &Result<ImageInfo, EnvError>) -> AssetOutcome {
        match (role, result) {
            (LayerRole::Sharp, Ok(info)) => AssetOutcome {
                layer_state: LayerState::Textured(*info),
                aspect: Some(info.aspect()),
            },
            (_, Ok(info)) => AssetOutcome {
                layer_state: LayerState::Textured(*info),
                aspect: None,
            },
            // A missing backdrop is simply not drawn
            (LayerRole::Blur, Err(_)) => AssetOutcome {
                layer_state: LayerState::Hidden,
                aspect: None,
            },
            (_, Err(_)) => AssetOutcome {
                layer_state: LayerState::Placeholder,
                aspect: None,
            },
        }
    }
}

/// Derives the URL of the pre-blurred copy of an image.
///
/// `cards/a.jpg` → `cards/a_blur.jpg`; without an extension `_blur` is
/// appended.
pub fn derive_blur_url(url: &str) -> String {
    let file_start = url.rfind('/').map_or(0, |i| i + 1);
    match url[file_start..].rfind('.') {
        Some(dot) if dot + 1 < url.len() - file_start => {
            let ext_start = file_start + dot;
            let ext = &url[ext_start + 1..];
            if ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                format!("{}_blur{}", &url[..ext_start], &url[ext_start..])
            } else {
                format!("{}_blur", url)
            }
        }
        _ => format!("{}_blur", url),
    }
}

/// Three stacked layers: a blurred backdrop, the sharp image, and a faint
/// glass plate in front.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredGlass {
    pub blur_depth: f64,
    pub glass_depth: f64,
    pub glass_opacity: f64,
}

impl Default for LayeredGlass {
    fn default() -> Self {
        Self {
            blur_depth: -0.003,
            glass_depth: 0.0015,
            glass_opacity: 0.08,
        }
    }
}

impl LayeredGlass {
    pub const BLUR_LAYER: usize = 0;
    pub const SHARP_LAYER: usize = 1;
    pub const GLASS_LAYER: usize = 2;
}

impl CardAppearance for LayeredGlass {
    fn name(&self) -> &'static str {
        "layered_glass"
    }

    fn build_visual(&self, renderer: &mut dyn Renderer, url: Option<&str>, index: usize) -> CardVisual {
        let blur_url = url.map(derive_blur_url);
        let desc = PanelDesc {
            layers: vec![
                LayerDesc {
                    role: LayerRole::Blur,
                    depth_offset: self.blur_depth,
                    opacity: 1.0,
                    depth_write: true,
                    source: blur_url.clone(),
                },
                LayerDesc {
                    role: LayerRole::Sharp,
                    depth_offset: 0.0,
                    opacity: 1.0,
                    depth_write: true,
                    source: url.map(str::to_string),
                },
                LayerDesc {
                    role: LayerRole::Glass,
                    depth_offset: self.glass_depth,
                    opacity: self.glass_opacity,
                    depth_write: false,
                    source: None,
                },
            ],
            render_order: index as i32,
        };
        let panel = renderer.create_panel(&desc);

        let mut requests = Vec::new();
        if let (Some(url), Some(blur_url)) = (url, blur_url) {
            requests.push(AssetRequest {
                layer: Self::SHARP_LAYER,
                role: LayerRole::Sharp,
                url: url.to_string(),
            });
            requests.push(AssetRequest {
                layer: Self::BLUR_LAYER,
                role: LayerRole::Blur,
                url: blur_url,
            });
        } else {
            // Nothing to load: the backdrop would never get a texture
            renderer.set_layer_state(panel, Self::BLUR_LAYER, LayerState::Hidden);
        }

        CardVisual { panel, requests }
    }
}

/// Just the sharp image, no decoration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatCard;

impl CardAppearance for FlatCard {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn build_visual(&self, renderer: &mut dyn Renderer, url: Option<&str>, index: usize) -> CardVisual {
        let desc = PanelDesc {
            layers: vec![LayerDesc {
                role: LayerRole::Sharp,
                depth_offset: 0.0,
                opacity: 1.0,
                depth_write: true,
                source: url.map(str::to_string),
            }],
            render_order: index as i32,
        };
        let panel = renderer.create_panel(&desc);
        let requests = url
            .map(|url| {
                vec![AssetRequest {
                    layer: 0,
                    role: LayerRole::Sharp,
                    url: url.to_string(),
                }]
            })
            .unwrap_or_default();

        CardVisual { panel, requests }
    }
}
