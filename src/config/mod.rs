pub(crate) mod types;

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;
pub(crate) use types::AuthzSettings;

use crate::{authorizer::StartupError, trace_err, utils::RUN_MODE_KEY};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub(crate) authz: AuthzSettings,
}

impl Settings {
    pub fn new() -> Result<Self, StartupError> {
        dotenv::dotenv().ok();

        let run_mode = std::env::var(RUN_MODE_KEY).unwrap_or("development".into());

        Settings::from_file(&run_mode)
    }

    pub fn from_file(file_name: &str) -> Result<Self, StartupError> {
        trace_err!(
            Config::builder()
                .add_source(File::with_name("config/default"))
                .add_source(File::with_name(&format!("config/{file_name}")).required(false))
                .add_source(Environment::with_prefix("APP").separator("__"))
                .build()?
                .try_deserialize(),
            "failed to build app settings"
        )
        .map_err(Into::into)
    }

    pub fn model_file(&self) -> &Path {
        &self.authz.model_file
    }

    pub fn policy_file(&self) -> &Path {
        &self.authz.policy_file
    }
}
