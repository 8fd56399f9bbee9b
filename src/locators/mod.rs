//! View template and static asset discovery.
//!
//! Both locators are plain producers of finite sequences; the services fan
//! out over every registered locator and concatenate the results.

pub mod static_files;
pub mod views;

pub use static_files::{StaticFile, WebRootLocator};
pub use views::{RazorViewLocator, View};

use crate::config::ActionmapConfig;
use crate::errors::Result;
use std::path::Path;

pub trait ViewLocator: Send + Sync {
    fn find(&self, root: &Path) -> Result<Vec<View>>;
}

pub trait StaticFileLocator: Send + Sync {
    fn find(&self, root: &Path) -> Result<Vec<StaticFile>>;
}

pub struct ViewLocatorService {
    locators: Vec<Box<dyn ViewLocator>>,
}

impl ViewLocatorService {
    pub fn new(locators: Vec<Box<dyn ViewLocator>>) -> Self {
        Self { locators }
    }

    pub fn find_views(&self, root: &Path) -> Result<Vec<View>> {
        let mut views = Vec::new();
        for locator in &self.locators {
            views.extend(locator.find(root)?);
        }
        Ok(views)
    }
}

pub struct StaticFileService {
    locators: Vec<Box<dyn StaticFileLocator>>,
}

impl StaticFileService {
    pub fn new(locators: Vec<Box<dyn StaticFileLocator>>) -> Self {
        Self { locators }
    }

    pub fn find_files(&self, root: &Path) -> Result<Vec<StaticFile>> {
        let mut files = Vec::new();
        for locator in &self.locators {
            files.extend(locator.find(root)?);
        }
        Ok(files)
    }
}

/// Locators enabled by the configuration.
pub fn default_services(config: &ActionmapConfig) -> (ViewLocatorService, StaticFileService) {
    let views: Vec<Box<dyn ViewLocator>> = if config.emit_views {
        vec![Box::new(RazorViewLocator)]
    } else {
        Vec::new()
    };
    let files: Vec<Box<dyn StaticFileLocator>> = if config.emit_static_files {
        vec![Box::new(WebRootLocator::new(&config.static_root))]
    } else {
        Vec::new()
    };
    (ViewLocatorService::new(views), StaticFileService::new(files))
}
