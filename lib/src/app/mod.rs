//! The host application context handed to every panel component.

mod options;
mod request;
mod i18n;

pub use options::*;
pub use request::*;
pub use i18n::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::panel::{PluginAssets, Plugins};
use crate::url::UrlBuf;
use crate::value::{Dict, Format, Source, Toml, Value};

/// File-system roots. Relative roots are resolved against `index`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roots {
    #[serde(default)]
    pub index: PathBuf,
    pub panel: Option<PathBuf>,
    pub media: Option<PathBuf>,
    pub plugins: Option<PathBuf>,
}

/// Public base URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Urls {
    pub index: Option<UrlBuf>,
    pub media: Option<UrlBuf>,
}

/// Application settings as read from a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub version: Option<String>,
    #[serde(default)]
    pub roots: Roots,
    #[serde(default)]
    pub urls: Urls,
    #[serde(default)]
    pub options: Dict,
    #[serde(default)]
    pub translations: Translations,
}

impl Settings {
    /// Reads settings from a TOML source.
    pub fn read<S: Source>(source: S) -> Result<Settings> {
        Toml::read(source)
    }
}

impl Roots {
    fn resolve(&self, root: &Option<PathBuf>, default: &str) -> PathBuf {
        match root {
            Some(path) => self.index.join(path),
            None => self.index.join(default),
        }
    }

    pub fn index(&self) -> &Path {
        &self.index
    }

    pub fn panel(&self) -> PathBuf {
        self.resolve(&self.panel, "panel")
    }

    pub fn media(&self) -> PathBuf {
        self.resolve(&self.media, "media")
    }

    pub fn plugins(&self) -> PathBuf {
        self.resolve(&self.plugins, "site/plugins")
    }
}

impl Urls {
    /// The site's base URL; `/` by default.
    pub fn index(&self) -> UrlBuf {
        self.index.clone().unwrap_or_else(|| UrlBuf::from("/"))
    }

    /// The public URL of the media root; `<index>/media` by default.
    pub fn media(&self) -> UrlBuf {
        self.media.clone().unwrap_or_else(|| {
            let mut url = self.index();
            url.append("media");
            url
        })
    }
}

/// Everything a panel component needs to know about the running application
/// and the request being served.
#[derive(derive_more::Debug)]
pub struct App {
    version: Arc<str>,
    roots: Roots,
    urls: Urls,
    options: Options,
    translations: Translations,
    request: Request,
    #[debug(ignore)]
    plugins: Arc<dyn PluginAssets>,
}

impl App {
    pub fn new(settings: Settings, request: Request) -> App {
        let Settings { version, roots, urls, options, translations } = settings;
        let plugins = Arc::new(Plugins::new(roots.plugins(), urls.media()));
        App {
            version: version.unwrap_or_else(|| env!("CARGO_PKG_VERSION").into()).into(),
            options: Options::new(options),
            roots,
            urls,
            translations,
            request,
            plugins,
        }
    }

    /// Replaces the plugin asset aggregator.
    pub fn with_plugins<P: PluginAssets + 'static>(mut self, plugins: P) -> App {
        self.plugins = Arc::new(plugins);
        self
    }

    /// Sets the option `key` to `value`, shadowing configuration.
    pub fn set_option<K: Into<Arc<str>>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.options.set(key, value);
    }

    /// Sets the option `key` to be computed by `f` whenever it is read.
    pub fn set_option_with<K, F>(&mut self, key: K, f: F)
        where K: Into<Arc<str>>, F: Fn(&App) -> Value + Send + Sync + 'static
    {
        self.options.set_with(key, f);
    }

    /// The value of the option `key`, if it is set. Computed options are
    /// evaluated now.
    pub fn option(&self, key: &str) -> Option<Value> {
        self.options.get(key).map(|option| option.resolve_with(|f| f(self)))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Identifies the running build: 32 hex characters derived from the
    /// version.
    ///
    /// ```rust
    /// use atrium::app::{App, Request, Settings};
    ///
    /// let settings = Settings { version: Some("4.0.0".into()), ..Default::default() };
    /// let app = App::new(settings, Request::new("/"));
    /// assert_eq!(app.version_hash().len(), 32);
    /// assert!(app.version_hash().chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    pub fn version_hash(&self) -> String {
        let digest = Sha256::digest(self.version.as_bytes());
        hex::encode(&digest[..16])
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn nonce(&self) -> &str {
        self.request.nonce()
    }

    pub fn plugins(&self) -> &dyn PluginAssets {
        &*self.plugins
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// The translation of `key`, or `key` itself.
    pub fn translate<'a>(&'a self, key: &'a str) -> &'a str {
        self.translations.translate(key, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_settings_from_toml() {
        let settings = Settings::read(String::from(r#"
            version = "4.1.0"

            [roots]
            index = "/srv/site"
            panel = "core/panel"
            media = "/var/media"

            [urls]
            index = "https://example.com"

            [options.panel]
            dev = false

            [translations]
            logout = "Abmelden"
        "#)).unwrap();

        let app = App::new(settings, Request::new("https://example.com/panel"));
        assert_eq!(app.roots().panel(), Path::new("/srv/site/core/panel"));
        assert_eq!(app.roots().media(), Path::new("/var/media"));
        assert_eq!(app.roots().plugins(), Path::new("/srv/site/site/plugins"));
        assert_eq!(app.urls().media().as_str(), "https://example.com/media");
        assert_eq!(app.option("panel.dev"), Some(Value::from(false)));
        assert_eq!(app.translate("logout"), "Abmelden");
        assert_eq!(app.translate("view.account"), "Your account");
    }

    #[test]
    fn computed_options_see_the_app() {
        let mut app = App::new(Settings::default(), Request::new("/panel"));
        app.set_option_with("panel.menu", |app| Value::from(app.request().path()));
        assert_eq!(app.option("panel.menu"), Some(Value::from("/panel")));
    }

    #[test]
    fn version_hash_tracks_version() {
        let app = |v: &str| {
            let settings = Settings { version: Some(v.into()), ..Default::default() };
            App::new(settings, Request::new("/")).version_hash()
        };

        assert_eq!(app("4.0.0"), app("4.0.0"));
        assert_ne!(app("4.0.0"), app("4.0.1"));
    }
}
