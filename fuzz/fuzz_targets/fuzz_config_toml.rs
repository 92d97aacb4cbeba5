//! Fuzz target for config file overlays.
//!
//! Arbitrary text must parse or fail with `ConfigFileError`, never panic.

#![no_main]

use coalesce_core::config::EnvConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut config = EnvConfig::default();
    if config.apply_toml(data).is_ok() {
        // A parsed overlay must still summarize cleanly.
        let _ = config.effective_config().env_pairs();
    }
});
