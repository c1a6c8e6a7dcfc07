// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One module per verb (spec.md §6).

pub mod inventory;
pub mod policies;
pub mod run;
pub mod wait_for_task_notification;

/// Collaborators shared by every verb, assembled once in `main` from the
/// loaded [`osconfig_daemon::Config`].
pub struct AgentContext {
    pub config: osconfig_daemon::Config,
    pub config_path: Option<std::path::PathBuf>,
    pub platform: std::sync::Arc<dyn osconfig_adapters::PlatformOps>,
    pub package_adapters: Vec<std::sync::Arc<dyn osconfig_adapters::PackageAdapter>>,
    pub http_client: reqwest::Client,
}

impl AgentContext {
    pub fn new(config: osconfig_daemon::Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
            platform: crate::wiring::platform(),
            package_adapters: crate::wiring::available_package_adapters(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn recipe_db_path(&self) -> std::path::PathBuf {
        self.config.recipe_db_path.clone().unwrap_or_else(|| self.platform.recipe_db_path())
    }

    pub fn live_state_path(&self) -> std::path::PathBuf {
        self.config.live_state_path.clone().unwrap_or_else(|| self.platform.live_state_path())
    }

    fn state_dir(&self) -> std::path::PathBuf {
        dirs::data_local_dir().unwrap_or_else(std::env::temp_dir).join("osconfig-agent")
    }

    pub fn lock_path(&self) -> std::path::PathBuf {
        self.state_dir().join("agent.lock")
    }

    pub fn restart_marker_path(&self) -> std::path::PathBuf {
        self.state_dir().join("restart-required")
    }

    pub fn control_plane_client(&self) -> Option<std::sync::Arc<dyn osconfig_adapters::ControlPlaneClient>> {
        self.config
            .control_plane_url
            .as_deref()
            .map(|url| std::sync::Arc::new(crate::control_plane_http::HttpControlPlaneClient::new(url))
                as std::sync::Arc<dyn osconfig_adapters::ControlPlaneClient>)
    }

    pub fn attributes_sink(&self) -> Option<osconfig_adapters::HttpAttributesSink> {
        self.config.attributes_url.as_deref().map(osconfig_adapters::HttpAttributesSink::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_db_path_prefers_config_override_over_platform_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = osconfig_daemon::Config::default();
        config.recipe_db_path = Some(dir.path().join("recipedb.json"));
        let ctx = AgentContext::new(config, None);
        assert_eq!(ctx.recipe_db_path(), dir.path().join("recipedb.json"));
    }

    #[test]
    #[serial_test::serial]
    fn state_dir_follows_xdg_data_home() {
        let dir = tempfile::tempdir().unwrap();
        let previous = std::env::var("XDG_DATA_HOME").ok();
        std::env::set_var("XDG_DATA_HOME", dir.path());

        let ctx = AgentContext::new(osconfig_daemon::Config::default(), None);
        assert_eq!(ctx.lock_path(), dir.path().join("osconfig-agent").join("agent.lock"));

        match previous {
            Some(value) => std::env::set_var("XDG_DATA_HOME", value),
            None => std::env::remove_var("XDG_DATA_HOME"),
        }
    }
}
