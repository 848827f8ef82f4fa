// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// This module handles loading and parsing configuration from config.toml.
// Provides sensible defaults if config file is missing or has errors.
//
// Validation layers are NOT configured here: they are fixed at build time.

use anyhow::{Context, Result};
use ash::vk;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::backend::swapchain::SELECTABLE_PRESENT_MODES;
use crate::backend::SwapchainPreferences;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub swapchain: SwapchainConfig,
    pub shaders: ShaderConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "unicraft".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

/// Swapchain preferences (the surface has the final say)
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SwapchainConfig {
    pub preferred_format: String,
    pub preferred_color_space: String,
    pub preferred_present_mode: String,
    pub fallback_present_mode: String,
}

impl Default for SwapchainConfig {
    fn default() -> Self {
        Self {
            preferred_format: "b8g8r8a8_srgb".to_string(),
            preferred_color_space: "srgb_nonlinear".to_string(),
            preferred_present_mode: "mailbox".to_string(),
            fallback_present_mode: "fifo".to_string(),
        }
    }
}

/// Compiled SPIR-V shaders
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/shader.vert.spv"),
            fragment: PathBuf::from("shaders/shader.frag.spv"),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {:#}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Swapchain preferences; the requested extent is filled in from the window
    pub fn swapchain_preferences(&self) -> SwapchainPreferences {
        let defaults = SwapchainPreferences::default();
        SwapchainPreferences {
            preferred_format: parse_format(&self.swapchain.preferred_format)
                .unwrap_or_else(|| unknown("format", &self.swapchain.preferred_format, defaults.preferred_format)),
            preferred_color_space: parse_color_space(&self.swapchain.preferred_color_space)
                .unwrap_or_else(|| {
                    unknown("color space", &self.swapchain.preferred_color_space, defaults.preferred_color_space)
                }),
            preferred_present_mode: parse_present_mode(&self.swapchain.preferred_present_mode)
                .filter(|mode| SELECTABLE_PRESENT_MODES.contains(mode))
                .unwrap_or_else(|| {
                    unknown("present mode", &self.swapchain.preferred_present_mode, defaults.preferred_present_mode)
                }),
            // Every surface supports FIFO, nothing else is a safe fallback
            fallback_present_mode: parse_present_mode(&self.swapchain.fallback_present_mode)
                .filter(|&mode| mode == vk::PresentModeKHR::FIFO)
                .unwrap_or_else(|| {
                    unknown("present mode", &self.swapchain.fallback_present_mode, defaults.fallback_present_mode)
                }),
            requested_extent: vk::Extent2D {
                width: self.window.width,
                height: self.window.height,
            },
        }
    }
}

fn unknown<T: std::fmt::Debug>(what: &str, name: &str, default: T) -> T {
    log::warn!("Unknown or unusable {} '{}', defaulting to {:?}", what, name, default);
    default
}

/// Get surface format as Vulkan enum
pub fn parse_format(name: &str) -> Option<vk::Format> {
    match name.to_lowercase().as_str() {
        "b8g8r8a8_srgb" => Some(vk::Format::B8G8R8A8_SRGB),
        "r8g8b8a8_srgb" => Some(vk::Format::R8G8B8A8_SRGB),
        "b8g8r8a8_unorm" => Some(vk::Format::B8G8R8A8_UNORM),
        "r8g8b8a8_unorm" => Some(vk::Format::R8G8B8A8_UNORM),
        _ => None,
    }
}

pub fn parse_color_space(name: &str) -> Option<vk::ColorSpaceKHR> {
    match name.to_lowercase().as_str() {
        "srgb_nonlinear" => Some(vk::ColorSpaceKHR::SRGB_NONLINEAR),
        _ => None,
    }
}

/// Get present mode as Vulkan enum
pub fn parse_present_mode(name: &str) -> Option<vk::PresentModeKHR> {
    match name.to_lowercase().as_str() {
        "immediate" => Some(vk::PresentModeKHR::IMMEDIATE),
        "mailbox" => Some(vk::PresentModeKHR::MAILBOX),
        "fifo" => Some(vk::PresentModeKHR::FIFO),
        "fifo_relaxed" => Some(vk::PresentModeKHR::FIFO_RELAXED),
        _ => None,
    }
}
