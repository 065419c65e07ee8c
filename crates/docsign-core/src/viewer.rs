//! Document viewer state
//!
//! Page rendering is delegated to a [`DocumentRenderer`]; this module owns
//! the navigation, zoom and rotation state that the overlay consumes.

use serde::{Deserialize, Serialize};
use shared_types::FormField;
use tracing::{debug, warn};

use crate::config::ViewerConfig;
use crate::coords::Rotation;
use crate::error::{DocsignError, Result};

/// Renders pages of a stored document
pub trait DocumentRenderer {
    /// Load the document behind `file_ref`, returning its page count
    fn load(&mut self, file_ref: &str) -> std::result::Result<u32, String>;

    /// Render one 1-based page at the given zoom and rotation
    fn render_page(
        &mut self,
        page: u32,
        scale: f64,
        rotation: Rotation,
    ) -> std::result::Result<RenderedPage, String>;
}

/// Size of a rendered page in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderedPage {
    pub page: u32,
    pub width: f64,
    pub height: f64,
}

/// Page, zoom and rotation currently shown
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// 1-based page number
    pub page: u32,
    pub scale: f64,
    pub rotation: Rotation,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            scale: 1.0,
            rotation: Rotation::Deg0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded { page_count: u32 },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ViewerState {
    config: ViewerConfig,
    view: ViewState,
    load: LoadState,
}

impl ViewerState {
    pub fn new(config: ViewerConfig) -> Self {
        let view = ViewState {
            scale: config.initial_scale,
            ..ViewState::default()
        };
        Self {
            config,
            view,
            load: LoadState::Loading,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Page count, or 0 until a document has loaded
    pub fn page_count(&self) -> u32 {
        match self.load {
            LoadState::Loaded { page_count } => page_count,
            LoadState::Loading | LoadState::Failed(_) => 0,
        }
    }

    /// Load `file_ref` through `renderer`, resetting to the first page
    pub fn load<R: DocumentRenderer + ?Sized>(&mut self, renderer: &mut R, file_ref: &str) -> Result<u32> {
        self.load = LoadState::Loading;
        match renderer.load(file_ref) {
            Ok(page_count) => {
                debug!(file_ref, page_count, "Document loaded");
                self.load = LoadState::Loaded { page_count };
                self.view.page = 1;
                Ok(page_count)
            }
            Err(reason) => {
                warn!(file_ref, %reason, "Document failed to load");
                self.load = LoadState::Failed(reason.clone());
                Err(DocsignError::DocumentLoad(reason))
            }
        }
    }

    /// Render the current page
    pub fn render<R: DocumentRenderer + ?Sized>(&self, renderer: &mut R) -> Result<RenderedPage> {
        renderer
            .render_page(self.view.page, self.view.scale, self.view.rotation)
            .map_err(DocsignError::DocumentLoad)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(self.view.scale + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(self.view.scale - self.config.zoom_step)
    }

    /// Zoom as a whole percentage, for display
    pub fn zoom_percent(&self) -> u32 {
        (self.view.scale * 100.0).round() as u32
    }

    fn set_scale(&mut self, scale: f64) -> f64 {
        // Round to hundredths so repeated steps don't drift
        let rounded = (scale * 100.0).round() / 100.0;
        self.view.scale = rounded.clamp(self.config.min_scale, self.config.max_scale);
        self.view.scale
    }

    /// Rotate a quarter turn clockwise
    pub fn rotate(&mut self) -> Rotation {
        self.view.rotation = self.view.rotation.next();
        self.view.rotation
    }

    pub fn previous_page(&mut self) -> u32 {
        self.view.page = self.view.page.saturating_sub(1).max(1);
        self.view.page
    }

    pub fn next_page(&mut self) -> u32 {
        self.view.page = (self.view.page + 1).min(self.page_count()).max(1);
        self.view.page
    }

    /// Jump to `page`, returning false if it is out of range
    pub fn go_to(&mut self, page: u32) -> bool {
        if page == 0 || page > self.page_count() {
            return false;
        }
        self.view.page = page;
        true
    }

    /// Fields that belong on the current page, in collection order
    pub fn fields_on_page<'a>(&self, fields: &'a [FormField]) -> Vec<&'a FormField> {
        fields.iter().filter(|f| f.page == self.view.page).collect()
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
