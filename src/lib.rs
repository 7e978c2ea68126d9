mod authorizer;
mod config;
pub(crate) mod middleware;
mod principal;
mod route;
pub(crate) mod utils;

pub use authorizer::{Authorizer, RoleGetter, StartupError};
pub use config::Settings;
pub use middleware::authorize::{authorize, AuthzError};
pub use principal::CurrentUser;
pub use route::RouteMeta;
