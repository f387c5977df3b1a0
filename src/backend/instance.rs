// Vulkan instance creation
//
// The instance is the root of every other Vulkan object. Its teardown is not
// owned by the caller: an InstanceGuard goes onto the deletion queue so the
// instance is destroyed after everything registered later.

use ash::vk;
use std::ffi::{CStr, CString};
use std::sync::Arc;

use super::gpu::InstanceLoader;
use crate::deletion_queue::DeletionQueue;
use crate::diagnostics::{ApiVersion, Diagnostics};

const ENGINE_NAME: &CStr = c"Emberlight";

/// Destroys the instance when the deletion queue releases it
pub struct InstanceGuard<I> {
    instance: I,
    destroy: fn(&I),
    diagnostics: Arc<dyn Diagnostics>,
}

impl<I> Drop for InstanceGuard<I> {
    fn drop(&mut self) {
        (self.destroy)(&self.instance);
        self.diagnostics.print("Deleted instance");
    }
}

/// Version reported by the loader. Loaders older than 1.1 cannot answer the
/// query, which means 1.0.
pub fn loader_version<L: InstanceLoader>(loader: &L) -> ApiVersion {
    match loader.instance_version() {
        Ok(Some(raw)) => ApiVersion::from_raw(raw),
        Ok(None) => ApiVersion::from_raw(vk::API_VERSION_1_0),
        Err(e) => {
            log::warn!("Failed to query instance version: {:?}", e);
            ApiVersion::from_raw(vk::API_VERSION_1_0)
        }
    }
}

pub fn extension_names(extensions: &[&CStr]) -> Vec<String> {
    extensions
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

/// Create the Vulkan instance with no validation layers and the given
/// extensions.
///
/// Returns `None` if the backend refuses; the failure is reported through
/// `diagnostics` and the caller decides what to do. On success the instance's
/// destruction is registered on `deletion_queue`.
pub fn create_instance<L: InstanceLoader>(
    loader: &L,
    application_name: &str,
    required_extensions: &[&CStr],
    diagnostics: &Arc<dyn Diagnostics>,
    deletion_queue: &mut DeletionQueue,
) -> Option<L::Instance> {
    diagnostics.print("Making an instance");

    let version = loader_version(loader);
    diagnostics.report_version(version);

    // Patch level must not influence compatibility
    let version = version.compatibility().raw();

    let Ok(app_name) = CString::new(application_name) else {
        diagnostics.print("Application name contains a NUL byte");
        return None;
    };

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(version)
        .engine_name(ENGINE_NAME)
        .engine_version(version)
        .api_version(version);

    diagnostics.print("Extensions to be requested:");
    diagnostics.print_list(&extension_names(required_extensions));

    let extension_ptrs: Vec<_> = required_extensions.iter().map(|name| name.as_ptr()).collect();

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_extension_names(&extension_ptrs);

    let instance = match loader.create_instance(&create_info) {
        Ok(instance) => instance,
        Err(e) => {
            diagnostics.print(&format!("Failed to create instance: {:?}", e));
            return None;
        }
    };

    deletion_queue.push(InstanceGuard {
        instance: instance.clone(),
        destroy: L::destroy_instance,
        diagnostics: diagnostics.clone(),
    });

    Some(instance)
}
