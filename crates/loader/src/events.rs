//! Loader event registry
//!
//! Plain callback registries replace UI-framework signal wiring: components
//! register handlers with `on_*` and the loader invokes them synchronously
//! from whichever thread produced the event. Handlers must not block.

use std::path::Path;
use std::sync::{Arc, Mutex};

use annotator_cache::Pixmap;
use image::DynamicImage;

use crate::error::LoadError;

/// Handler for successfully loaded images.
pub type ImageLoadedHandler = Arc<dyn Fn(&Path, &Arc<DynamicImage>, &Arc<Pixmap>) + Send + Sync>;

/// Handler for failed loads.
pub type LoadFailedHandler = Arc<dyn Fn(&Path, &LoadError) + Send + Sync>;

/// Handler for batch progress: (file name, percent complete).
pub type ProgressHandler = Arc<dyn Fn(&str, u8) + Send + Sync>;

/// Handler fired once when all submitted work has drained.
pub type DrainedHandler = Arc<dyn Fn() + Send + Sync>;

/// Event registry exposed by the loader.
#[derive(Default)]
pub struct LoaderEvents {
    loaded: Mutex<Vec<ImageLoadedHandler>>,
    failed: Mutex<Vec<LoadFailedHandler>>,
    progress: Mutex<Vec<ProgressHandler>>,
    drained: Mutex<Vec<DrainedHandler>>,
}

impl LoaderEvents {
    /// Register a handler for image-loaded events.
    pub fn on_image_loaded(&self, handler: ImageLoadedHandler) {
        self.loaded.lock().unwrap().push(handler);
    }

    /// Register a handler for image-load-failed events.
    pub fn on_image_load_failed(&self, handler: LoadFailedHandler) {
        self.failed.lock().unwrap().push(handler);
    }

    /// Register a handler for loading-progress events.
    pub fn on_loading_progress(&self, handler: ProgressHandler) {
        self.progress.lock().unwrap().push(handler);
    }

    /// Register a handler for the all-work-drained event.
    pub fn on_all_work_drained(&self, handler: DrainedHandler) {
        self.drained.lock().unwrap().push(handler);
    }

    pub(crate) fn emit_loaded(&self, path: &Path, image: &Arc<DynamicImage>, pixmap: &Arc<Pixmap>) {
        let handlers = self.loaded.lock().unwrap().clone();
        for handler in handlers {
            handler(path, image, pixmap);
        }
    }

    pub(crate) fn emit_failed(&self, path: &Path, error: &LoadError) {
        log::warn!("load failed for {}: {}", path.display(), error);
        let handlers = self.failed.lock().unwrap().clone();
        for handler in handlers {
            handler(path, error);
        }
    }

    pub(crate) fn emit_progress(&self, label: &str, percent: u8) {
        let handlers = self.progress.lock().unwrap().clone();
        for handler in handlers {
            handler(label, percent);
        }
    }

    pub(crate) fn emit_drained(&self) {
        let handlers = self.drained.lock().unwrap().clone();
        for handler in handlers {
            handler();
        }
    }
}
