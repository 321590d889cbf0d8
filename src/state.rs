use std::sync::Arc;

use crate::config::Config;
use crate::directory::ProjectDirectory;
use crate::provisioning::Provisioner;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub directory: ProjectDirectory,
    pub provisioner: Provisioner,
}
