//! Presentation settings
//!
//! Persisted in LocalStorage on the web; built from CLI flags natively.
//! Nothing here affects the simulation.

use serde::{Deserialize, Serialize};

/// Windowed surface size (pixels)
pub const WINDOWED_SIZE: (u32, u32) = (1280, 720);
/// Surface size assumed for fullscreen when no display is attached
pub const FULLSCREEN_SIZE: (u32, u32) = (1920, 1080);

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Take over the whole display
    pub fullscreen: bool,
    /// Sync presentation to the display refresh
    pub vsync: bool,
    /// Log the frame rate once per second
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fullscreen: false,
            vsync: false,
            show_fps: true,
        }
    }
}

impl Settings {
    /// Surface size implied by the fullscreen flag (native headless runs)
    pub fn surface_size(&self) -> (u32, u32) {
        if self.fullscreen {
            FULLSCREEN_SIZE
        } else {
            WINDOWED_SIZE
        }
    }

    /// wgpu present mode for the vsync flag
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "flappy_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_follows_fullscreen() {
        let mut settings = Settings::default();
        assert_eq!(settings.surface_size(), WINDOWED_SIZE);
        settings.fullscreen = true;
        assert_eq!(settings.surface_size(), FULLSCREEN_SIZE);
    }

    #[test]
    fn test_present_mode_follows_vsync() {
        let mut settings = Settings::default();
        assert_eq!(settings.present_mode(), wgpu::PresentMode::AutoNoVsync);
        settings.vsync = true;
        assert_eq!(settings.present_mode(), wgpu::PresentMode::AutoVsync);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "vsync": true }"#).unwrap();
        assert!(settings.vsync);
        assert!(!settings.fullscreen);
        assert!(settings.show_fps);
    }
}
