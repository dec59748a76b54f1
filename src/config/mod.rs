//! Configuration module for metricize.
//!
//! Handles the config file, environment variables, and the deployment
//! environment flag.

mod settings;

pub use settings::{
    expand_env_vars, Environment, Settings, SettingsError, CONFIG_ENV_VAR, ENVIRONMENT_ENV_VAR,
};
