use crate::{gemini, tg};
use serde::de::DeserializeOwned;

/// Configuration of the whole application. Every part of it is read from
/// environment variables with its own prefix.
pub struct Config {
    pub(crate) tg: tg::Config,
    pub(crate) gemini: gemini::Config,
}

impl Config {
    pub fn load_or_panic() -> Config {
        Self {
            tg: from_env_or_panic("TG_"),
            gemini: from_env_or_panic("GEMINI_"),
        }
    }
}

pub(crate) fn from_env_or_panic<T: DeserializeOwned>(prefix: &str) -> T {
    envy::prefixed(prefix).from_env().unwrap_or_else(|err| {
        panic!(
            "BUG: Couldn't load config from environment for {} (prefix: `{prefix}`): {:#?}",
            std::any::type_name::<T>(),
            err
        );
    })
}
