// Validation bootstrap and diagnostic message sink
//
// Responsibilities:
// - Decide (at build time) whether validation layers are requested
// - Verify every requested layer is installed before instance creation
// - Build the messenger create info chained into instance creation
// - Resolve the debug-utils functions and install the long-lived messenger

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry};
use std::ffi::{c_char, CStr, CString};

use super::error::{BootstrapError, BootstrapResult};

/// Layers requested when validation is enabled
pub const VALIDATION_LAYERS: &[&CStr] = &[c"VK_LAYER_KHRONOS_validation"];

/// Debug builds always validate; release builds only with the `validation` feature
pub const ENABLE_VALIDATION: bool = cfg!(any(debug_assertions, feature = "validation"));

/// Which diagnostic layers this build requests
#[derive(Debug, Clone)]
pub struct Validation {
    enabled: bool,
    layers: Vec<&'static CStr>,
}

impl Validation {
    /// Settings selected at compile time
    pub fn from_build() -> Self {
        if ENABLE_VALIDATION {
            Self::with_layers(VALIDATION_LAYERS)
        } else {
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            layers: Vec::new(),
        }
    }

    pub fn with_layers(layers: &[&'static CStr]) -> Self {
        Self {
            enabled: true,
            layers: layers.to_vec(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Requested layers; empty when validation is off
    pub fn layers(&self) -> &[&'static CStr] {
        &self.layers
    }

    pub fn layer_name_ptrs(&self) -> Vec<*const c_char> {
        self.layers.iter().map(|name| name.as_ptr()).collect()
    }

    /// Fail unless every requested layer is installed
    pub fn check_support(&self, entry: &Entry) -> BootstrapResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let available = entry
            .enumerate_instance_layer_properties()
            .map_err(BootstrapError::query("vkEnumerateInstanceLayerProperties"))?;
        let available: Vec<CString> = available
            .iter()
            .map(|props| fixed_name(&props.layer_name))
            .collect();

        self.check_against(&available)?;
        log::info!("Validation layers were requested successfully");
        Ok(())
    }

    fn check_against(&self, available: &[CString]) -> BootstrapResult<()> {
        let missing = missing_layers(&self.layers, available);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BootstrapError::MissingLayers { missing })
        }
    }
}

/// Requested layer names absent from `available` (exact, case-sensitive)
pub fn missing_layers(requested: &[&CStr], available: &[CString]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !available.iter().any(|have| have.as_c_str() == **name))
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

/// Convert a NUL-terminated fixed-size name array from a Vulkan struct
pub(crate) fn fixed_name(raw: &[c_char]) -> CString {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    CString::new(bytes).unwrap_or_default()
}

/// Messenger configuration shared by instance creation and the long-lived sink
pub fn messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Log level used for a message of the given severity
pub fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

// Never aborts the triggering call, whatever the severity
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message);

    log::log!(
        target: "vulkan",
        severity_level(message_severity),
        "[validation layer] {}",
        message.to_string_lossy()
    );

    vk::FALSE
}

/// Debug-utils entry points, resolved once per instance
#[derive(Clone)]
pub enum DebugUtilsFns {
    Available(DebugUtils),
    Unavailable,
}

impl DebugUtilsFns {
    pub fn resolve(entry: &Entry, instance: &ash::Instance) -> Self {
        let handle = instance.handle();
        let create = unsafe {
            entry.get_instance_proc_addr(handle, c"vkCreateDebugUtilsMessengerEXT".as_ptr())
        };
        let destroy = unsafe {
            entry.get_instance_proc_addr(handle, c"vkDestroyDebugUtilsMessengerEXT".as_ptr())
        };

        match (create, destroy) {
            (Some(_), Some(_)) => Self::Available(DebugUtils::new(entry, instance)),
            _ => Self::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// State of the long-lived diagnostic sink
pub enum MessengerState {
    /// Validation is off for this build, or the messenger was destroyed
    Disabled,
    /// Requested, but the driver could not provide it
    Unavailable,
    Installed {
        loader: DebugUtils,
        messenger: vk::DebugUtilsMessengerEXT,
    },
}

/// Long-lived diagnostic sink
pub struct DebugMessenger {
    state: MessengerState,
}

impl DebugMessenger {
    /// Install the sink; never fails the bootstrap
    pub fn install(fns: &DebugUtilsFns, validation: &Validation) -> Self {
        if !validation.is_enabled() {
            return Self {
                state: MessengerState::Disabled,
            };
        }

        let loader = match fns {
            DebugUtilsFns::Available(loader) => loader.clone(),
            DebugUtilsFns::Unavailable => {
                log::warn!("vkCreateDebugUtilsMessengerEXT not found, debug messenger not installed");
                return Self {
                    state: MessengerState::Unavailable,
                };
            }
        };

        let create_info = messenger_create_info();
        let state = match unsafe { loader.create_debug_utils_messenger(&create_info, None) } {
            Ok(messenger) => {
                log::info!("Set up debug messenger");
                MessengerState::Installed { loader, messenger }
            }
            Err(e) => {
                log::error!("Failed to set up debug messenger: {}", e);
                MessengerState::Unavailable
            }
        };
        Self { state }
    }

    pub fn state(&self) -> &MessengerState {
        &self.state
    }

    pub fn is_installed(&self) -> bool {
        matches!(self.state, MessengerState::Installed { .. })
    }

    /// Destroy the messenger; no-op unless installed. Idempotent.
    pub fn destroy(&mut self) {
        let state = std::mem::replace(&mut self.state, MessengerState::Disabled);
        if let MessengerState::Installed { loader, messenger } = state {
            unsafe { loader.destroy_debug_utils_messenger(messenger, None) };
            log::info!("Destroyed debug messenger");
        }
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        self.destroy();
    }
}
