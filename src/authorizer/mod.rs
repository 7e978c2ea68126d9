use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{extract::Request, BoxError};
use casbin::{CoreApi, DefaultModel, Enforcer, FileAdapter};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::Settings;

/// Resolves the acting subject's role from the raw request.
pub type RoleGetter = Arc<dyn Fn(&Request) -> Result<String, BoxError> + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) enum RoleSource {
    /// Read the role off the `CurrentUser` extension placed by the
    /// authentication middleware upstream.
    #[default]
    Principal,
    Getter(RoleGetter),
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load configs")]
    LoadConfig(#[from] config::ConfigError),

    #[error("Failed to build policy enforcer")]
    BuildEnforcer(#[from] casbin::Error),
}

/// Policy decision point shared by every request task. Construct it once in
/// the composition root and hand clones to the routers that need gating.
///
/// Serving without a valid policy is unsafe, so construction fails hard;
/// whether that aborts the process is the caller's call.
#[derive(Clone)]
pub struct Authorizer {
    enforcer: Arc<RwLock<Enforcer>>,
    model_file: PathBuf,
    policy_file: PathBuf,
    roles: RoleSource,
}

impl Authorizer {
    #[instrument(name = "authorizer::new", skip_all)]
    pub async fn new(
        model_file: impl Into<PathBuf>,
        policy_file: impl Into<PathBuf>,
    ) -> Result<Self, StartupError> {
        let model_file = model_file.into();
        let policy_file = policy_file.into();
        info!(model_file = %model_file.display(), policy_file = %policy_file.display(), "building authorizer");

        let enforcer = build_enforcer(&model_file, &policy_file).await?;

        Ok(Self {
            enforcer: Arc::new(RwLock::new(enforcer)),
            model_file,
            policy_file,
            roles: RoleSource::default(),
        })
    }

    pub async fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        Self::new(settings.model_file(), settings.policy_file()).await
    }

    /// Switches role resolution from the `CurrentUser` extension to the
    /// supplied closure.
    pub fn with_role_getter(
        mut self,
        getter: impl Fn(&Request) -> Result<String, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.roles = RoleSource::Getter(Arc::new(getter));
        self
    }

    /// One oracle query. Decisions are never cached; every request pays for
    /// its own evaluation.
    #[instrument(name = "authorizer::evaluate", skip(self))]
    pub async fn evaluate(
        &self,
        role: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, casbin::Error> {
        let enforcer = self.enforcer.read().await;
        enforcer.enforce((role, resource, action))
    }

    /// Ad-hoc check outside the middleware chain (e.g. when deciding whether
    /// to render an action link). Conflates "denied" and "evaluation failed"
    /// into `false`, so keep it away from anything security-critical that
    /// needs to distinguish the two.
    #[instrument(name = "authorizer::is_authorized_for", skip(self))]
    pub async fn is_authorized_for(&self, role: &str, resource: &str, action: &str) -> bool {
        self.evaluate(role, resource, action)
            .await
            .unwrap_or_else(|e| {
                error!(%e, "policy evaluation failed, reporting unauthorized");
                false
            })
    }

    /// Rebuilds the enforcer from the originally configured files and swaps
    /// it in under the write lock. On failure the previous policy stays live.
    #[instrument(name = "authorizer::reload", skip_all)]
    pub async fn reload(&self) -> Result<(), StartupError> {
        let fresh = build_enforcer(&self.model_file, &self.policy_file).await?;
        *self.enforcer.write().await = fresh;

        info!(policy_file = %self.policy_file.display(), "policy reloaded");
        Ok(())
    }

    pub(crate) fn role_source(&self) -> &RoleSource {
        &self.roles
    }
}

async fn build_enforcer(model_file: &Path, policy_file: &Path) -> Result<Enforcer, casbin::Error> {
    let model = DefaultModel::from_file(model_file).await?;
    let adapter = FileAdapter::new(policy_file.to_path_buf());

    Enforcer::new(model, adapter).await
}
