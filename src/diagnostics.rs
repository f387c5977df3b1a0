// Diagnostics sink
//
// Components that report progress take an `Arc<dyn Diagnostics>` instead of
// reaching for a process-wide logger. The default implementation forwards
// to the `log` facade.

use ash::vk;
use std::fmt;

/// Vulkan API version split into its components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    raw: u32,
}

impl ApiVersion {
    /// Patch bits of a packed Vulkan version number
    const PATCH_MASK: u32 = 0xFFF;

    pub const fn from_raw(raw: u32) -> Self {
        Self { raw }
    }

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { raw: vk::make_api_version(0, major, minor, patch) }
    }

    pub const fn raw(self) -> u32 {
        self.raw
    }

    pub const fn variant(self) -> u32 {
        vk::api_version_variant(self.raw)
    }

    pub const fn major(self) -> u32 {
        vk::api_version_major(self.raw)
    }

    pub const fn minor(self) -> u32 {
        vk::api_version_minor(self.raw)
    }

    pub const fn patch(self) -> u32 {
        vk::api_version_patch(self.raw)
    }

    /// Same version with the patch component cleared.
    ///
    /// Used for the application, engine and API version fields so that
    /// patch-level loader differences never affect compatibility checks.
    pub const fn compatibility(self) -> Self {
        Self { raw: self.raw & !Self::PATCH_MASK }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Variant: {}, Major: {}, Minor: {}, Patch: {}",
            self.variant(),
            self.major(),
            self.minor(),
            self.patch()
        )
    }
}

/// Sink for free-form messages, version reports and name lists
pub trait Diagnostics: Send + Sync {
    fn print(&self, message: &str);

    fn report_version(&self, version: ApiVersion);

    fn print_list(&self, items: &[String]);
}

/// Forwards everything to the `log` crate at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn print(&self, message: &str) {
        log::info!("{}", message);
    }

    fn report_version(&self, version: ApiVersion) {
        log::info!("System can support Vulkan {}", version);
    }

    fn print_list(&self, items: &[String]) {
        for item in items {
            log::info!("\t\"{}\"", item);
        }
    }
}
