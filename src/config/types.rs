use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthzSettings {
    pub model_file: PathBuf,
    pub policy_file: PathBuf,
}
