// Windowing collaborator
//
// The renderer never talks to winit directly. It asks a SurfaceProvider for
// the instance extensions presentation needs and for a surface once the
// instance exists.

use anyhow::{Context, Result};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CStr;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;

pub trait SurfaceProvider {
    /// Instance extensions required to present to this window
    fn required_extensions(&self) -> Result<Vec<&'static CStr>>;

    fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<vk::SurfaceKHR>;
}

impl SurfaceProvider for winit::window::Window {
    fn required_extensions(&self) -> Result<Vec<&'static CStr>> {
        let display_handle = self
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();

        let extensions = ash_window::enumerate_required_extensions(display_handle)
            .context("Failed to enumerate surface extensions")?;

        // SAFETY: ash-window hands out pointers to static, NUL-terminated names
        Ok(extensions
            .iter()
            .map(|&name| unsafe { CStr::from_ptr(name) })
            .collect())
    }

    fn create_surface(&self, entry: &ash::Entry, instance: &ash::Instance) -> Result<vk::SurfaceKHR> {
        let display_handle = self
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();
        let window_handle = self
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();

        unsafe { ash_window::create_surface(entry, instance, display_handle, window_handle, None) }
            .context("Failed to create window surface")
    }
}

/// Owns a surface; registered on the deletion queue right after the instance
pub struct SurfaceGuard {
    loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    diagnostics: Arc<dyn Diagnostics>,
}

impl SurfaceGuard {
    pub fn new(
        loader: ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self { loader, surface, diagnostics }
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        unsafe {
            self.loader.destroy_surface(self.surface, None);
        }
        self.diagnostics.print("Deleted surface");
    }
}
