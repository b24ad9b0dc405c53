//! Compiler configuration

use crate::error::{Error, Result};

/// Environment variable that disables dead-variable elimination when truthy
pub const ENV_NO_OPTIMIZE: &str = "MINIJC_NO_OPTIMIZE";
/// Environment variable that disables post-generation verification when truthy
pub const ENV_NO_VERIFY: &str = "MINIJC_NO_VERIFY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Run the dead-variable optimizer before code generation
    pub optimize: bool,
    /// Verify every generated class before it is written
    pub verify: bool,
    /// Extension of emitted assembly files, without the dot
    pub output_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimize: true,
            verify: true,
            output_extension: "j".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration adjusted by `MINIJC_NO_OPTIMIZE` and `MINIJC_NO_VERIFY`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if env_flag(ENV_NO_OPTIMIZE)? {
            config.optimize = false;
        }
        if env_flag(ENV_NO_VERIFY)? {
            config.verify = false;
        }
        Ok(config)
    }

    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.output_extension = extension.into();
        self
    }

    /// File name of the artifact produced for `class_name`
    pub fn artifact_name(&self, class_name: &str) -> String {
        if self.output_extension.is_empty() {
            class_name.to_string()
        } else {
            format!("{}.{}", class_name, self.output_extension)
        }
    }
}

fn env_flag(name: &str) -> Result<bool> {
    match std::env::var(name) {
        Ok(value) => parse_flag(name, &value),
        Err(std::env::VarError::NotPresent) => Ok(false),
        Err(std::env::VarError::NotUnicode(_)) => {
            Err(Error::config_error(format!("{} is not valid unicode", name)))
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(Error::config_error(format!("{}: unrecognised value '{}'", name, other))),
    }
}
