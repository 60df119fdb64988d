use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-facing switches; persisting them is up to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// When disabled, ticks do nothing (the scheduler keeps its position)
    pub enabled: bool,

    /// Enables screen-space reflections in the host's shaders; the
    /// reflections variant (and its kernels) is used only when this is set
    pub enable_ssr: bool,

    /// Developer mode for authoring default cubemaps
    pub enable_creator: bool,
}

impl Settings {
    /// Defines the host should compile its own shaders with.
    pub fn shader_defines(&self) -> Vec<(&'static str, &'static str)> {
        let mut defines = Vec::new();

        if self.enable_ssr {
            defines.push(("ENABLESSR", ""));
        }

        defines
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_ssr: true,
            enable_creator: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cubemap used where neither the capture nor the probe knows better; a
    /// PNG with six square faces stacked vertically (+X, -X, +Y, -Y, +Z, -Z)
    pub default_cubemap: PathBuf,

    /// When set, kernels are read from this directory each time they get
    /// compiled (so editing them and sending `Event::ShadersChanged` reloads
    /// them); otherwise the copies embedded in the crate are used
    pub shader_dir: Option<PathBuf>,

    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_cubemap: PathBuf::from(
                "data/shaders/dynamic-cubemaps/default-cubemap.png",
            ),
            shader_dir: None,
            settings: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_defines() {
        let mut settings = Settings::default();

        assert_eq!(vec![("ENABLESSR", "")], settings.shader_defines());

        settings.enable_ssr = false;

        assert!(settings.shader_defines().is_empty());
    }
}
