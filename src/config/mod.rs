//! Runner settings and base configuration loading
//!
//! Settings come from defaults, an optional settings file, the environment and
//! CLI flags (CLI > Env > File > Defaults).

pub mod loader;
pub mod settings;

pub use loader::load_base_config;
pub use settings::{load_settings, RunnerSettings, SettingsOverrides, TrainerSettings};
