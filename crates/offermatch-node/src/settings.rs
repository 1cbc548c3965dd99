//! Node configuration loading.
//!
//! Built-in defaults, then an optional `offermatch.toml`, then environment
//! variables prefixed with `OFFERMATCH_` (nested fields separated by `__`).
//! For example `OFFERMATCH_PLATFORM__BASE_URL=http://bisq:8080`.

use offermatch_types::ExchangeConfig;

pub const CONFIG_FILE: &str = "offermatch";
pub const ENV_PREFIX: &str = "OFFERMATCH";

pub fn load() -> Result<ExchangeConfig, config::ConfigError> {
    load_from(CONFIG_FILE)
}

/// Load with `file` (extension optional) in place of `offermatch.toml`.
pub fn load_from(file: &str) -> Result<ExchangeConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(file).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
