// Vulkan Instance - top-level graphics context
//
// Responsibilities:
// - Load the Vulkan library
// - Check validation layer support before anything is created
// - Create the instance with window-system + debug extensions
// - Resolve the optional debug-utils entry points

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry};
use std::ffi::{c_char, CStr};

use super::error::{BootstrapError, BootstrapResult};
use super::validation::{self, DebugMessenger, DebugUtilsFns, Validation};

pub const APP_NAME: &CStr = c"unicraft";
pub const ENGINE_NAME: &CStr = c"unicraft engine";
pub const APP_VERSION: u32 = vk::make_api_version(0, 1, 0, 0);
pub const ENGINE_VERSION: u32 = vk::make_api_version(0, 1, 0, 0);
pub const API_VERSION: u32 = vk::API_VERSION_1_0;

/// The graphics context. Destroyed last.
pub struct BackendInstance {
    pub entry: Entry,
    pub instance: ash::Instance,
    validation: Validation,
    debug_utils: DebugUtilsFns,
    destroyed: bool,
}

impl BackendInstance {
    /// Create the instance
    ///
    /// # Arguments
    /// * `window_extensions` - Surface extensions the window system needs
    /// * `validation` - Layers requested by this build
    pub fn new(window_extensions: &[&CStr], validation: Validation) -> BootstrapResult<Self> {
        let entry = unsafe { Entry::load() }?;

        // Fail fast before creating anything
        validation.check_support(&entry)?;

        let extensions = required_extensions(window_extensions, &validation);
        log_extensions(&entry, &extensions);

        let app_info = vk::ApplicationInfo::builder()
            .application_name(APP_NAME)
            .application_version(APP_VERSION)
            .engine_name(ENGINE_NAME)
            .engine_version(ENGINE_VERSION)
            .api_version(API_VERSION);

        let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();
        let layer_ptrs = validation.layer_name_ptrs();

        // Chained so messages emitted by vkCreateInstance itself are captured
        let mut debug_create_info = validation::messenger_create_info();

        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);
        if validation.is_enabled() {
            create_info = create_info.push_next(&mut debug_create_info);
        }

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .map_err(BootstrapError::creation("VkInstance"))?;
        log::info!("Created VkInstance");

        let debug_utils = if validation.is_enabled() {
            DebugUtilsFns::resolve(&entry, &instance)
        } else {
            DebugUtilsFns::Unavailable
        };

        Ok(Self {
            entry,
            instance,
            validation,
            debug_utils,
            destroyed: false,
        })
    }

    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    /// Install the long-lived message sink (non-fatal when unavailable)
    pub fn install_debug_messenger(&self) -> DebugMessenger {
        DebugMessenger::install(&self.debug_utils, &self.validation)
    }

    /// Destroy the instance. Every dependent object must already be gone.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        unsafe { self.instance.destroy_instance(None) };
        log::info!("Destroyed VkInstance");
    }
}

impl Drop for BackendInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Window-system extensions, plus debug utils when validating
pub fn required_extensions<'a>(window_extensions: &[&'a CStr], validation: &Validation) -> Vec<&'a CStr> {
    let mut extensions = window_extensions.to_vec();
    if validation.is_enabled() {
        extensions.push(DebugUtils::name());
    }
    extensions
}

fn log_extensions(entry: &Entry, required: &[&CStr]) {
    match entry.enumerate_instance_extension_properties(None) {
        Ok(available) => {
            log::debug!("Number of available extensions: {}", available.len());
            for ext in &available {
                log::debug!("\t{}", validation::fixed_name(&ext.extension_name).to_string_lossy());
            }
        }
        Err(e) => log::warn!("Could not enumerate instance extensions: {}", e),
    }

    log::info!("Required extensions:");
    for ext in required {
        log::info!("\t{}", ext.to_string_lossy());
    }
}
