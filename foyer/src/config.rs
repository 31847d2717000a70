use std::path::Path;

use serde::Deserialize;

use atrium::App;
use atrium::app::{Request, Settings};
use atrium::error::Result;
use atrium::panel::{Areas, Permissions};
use atrium::value::{Format, Toml};

/// The application settings plus what the host would otherwise register at
/// runtime: its areas and the current user's permissions.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(default)]
    pub areas: Areas,
    #[serde(default)]
    pub permissions: Permissions,
}

impl Config {
    /// Reads the configuration at `path`, or `foyer.toml` in the working
    /// directory if it exists. The index root is resolved against the
    /// configuration file's directory.
    pub fn read(path: Option<&Path>) -> Result<Config> {
        let default = Path::new(crate::CONFIG_FILE);
        let path = match path {
            Some(path) => path,
            None if default.is_file() => default,
            None => return Ok(Config::default()),
        };

        let mut config: Config = Toml::read(path)?;
        let dir = path.parent().unwrap_or(Path::new(""));
        config.settings.roots.index = dir.join(&config.settings.roots.index);
        tracing::debug!(config = %path.display(), index = %config.settings.roots.index.display(), "read configuration");
        Ok(config)
    }

    /// The application context for a request to `url`.
    pub fn app(&self, url: &str) -> App {
        App::new(self.settings.clone(), Request::new(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium::panel::{Menu, MenuItem};

    #[test]
    fn areas_and_permissions_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        std::fs::write(&path, r#"
            version = "1.0.0"

            [roots]
            panel = "core/panel"

            [options.panel]
            menu = ["users", "-", "site"]

            [[areas]]
            id = "site"
            label = "Site"
            link = "site"
            menu = true

            [[areas]]
            id = "users"
            label = "Users"
            link = "users"
            menu = true

            [permissions.access]
            users = false
        "#).unwrap();

        let config = Config::read(Some(&path)).unwrap();
        assert_eq!(config.settings.roots.index, dir.path());
        assert_eq!(config.settings.roots.panel(), dir.path().join("core/panel"));

        let app = config.app("/panel/site");
        let menu = Menu::new(&app, &config.areas, &config.permissions, Some("site"));
        let entries = menu.entries().unwrap();
        assert_eq!(entries[0], MenuItem::Separator);
        match &entries[1] {
            MenuItem::Entry(site) => assert!(site.current),
            MenuItem::Separator => panic!("expected the site entry"),
        }
    }
}
