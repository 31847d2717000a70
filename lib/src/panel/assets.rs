use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::app::{generate_nonce, App};
use crate::dict;
use crate::error::{Error, Result, Chainable};
use crate::fstree::FsTree;
use crate::url::UrlBuf;
use crate::util;
use crate::value::{Dict, Source, Value};

/// Written by the panel's development server while it runs.
const VITE_MARKER: &str = ".vite-running";

/// Port of the panel's development server.
const VITE_PORT: u16 = 3000;

/// The panel's stylesheets, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Styles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<UrlBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<UrlBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<UrlBuf>,
}

/// A `<script>` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    pub nonce: Arc<str>,
    pub src: UrlBuf,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub defer: bool,
}

/// The panel's scripts, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scripts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vite: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vue: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pluginloader: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Script>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Script>,
}

impl Scripts {
    /// The present scripts with their names, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Script)> {
        [
            ("vite", &self.vite),
            ("vue", &self.vue),
            ("vendor", &self.vendor),
            ("pluginloader", &self.pluginloader),
            ("plugins", &self.plugins),
            ("custom", &self.custom),
            ("index", &self.index),
        ].into_iter().filter_map(|(name, script)| Some((name, script.as_ref()?)))
    }
}

/// Everything the panel's HTML shell references.
#[derive(Debug, Clone, Serialize)]
pub struct External {
    pub css: Styles,
    pub icons: Dict,
    #[serde(rename = "plugin-imports")]
    pub plugin_imports: String,
    pub js: Scripts,
}

/// Resolves the panel's asset URLs for one request and links the built
/// assets into the media folder.
///
/// Assets are served by the development server instead when
/// `<panel>/.vite-running` exists, unless the `panel.dev` option is `false`.
/// A string `panel.dev` names the development server's URL.
#[derive(Debug)]
pub struct Assets<'a> {
    app: &'a App,
    dev: bool,
    url: UrlBuf,
}

impl<'a> Assets<'a> {
    pub fn new(app: &'a App) -> Self {
        let running = app.roots().panel().join(VITE_MARKER).is_file();
        let dev = running && app.option("panel.dev") != Some(Value::Bool(false));
        let url = match (dev, app.option("panel.dev")) {
            (true, Some(Value::String(url))) => UrlBuf::from(&*url),
            (true, _) => {
                let mut url = app.request().origin_with_port(VITE_PORT);
                url.trim_end_slashes();
                url
            }
            (false, _) => {
                let mut url = app.urls().media();
                url.extend(["panel", app.version_hash().as_str()]);
                url
            }
        };

        tracing::debug!(dev, %url, "resolved panel asset url");
        Assets { app, dev, url }
    }

    pub fn is_dev(&self) -> bool {
        self.dev
    }

    /// The base URL of every built asset.
    pub fn url(&self) -> &UrlBuf {
        &self.url
    }

    fn asset(&self, path: &str) -> UrlBuf {
        let mut url = self.url.clone();
        url.append(path);
        url
    }

    /// The file at `path` below the index root, with or without a leading
    /// `/`.
    fn index_file(&self, path: &str) -> PathBuf {
        self.app.roots().index().join(path.trim_start_matches('/'))
    }

    /// The URL of the file named by the option `option`, relative to the
    /// index root, tagged with its modification time. `None` if the option is
    /// unset or the file does not exist.
    pub fn custom(&self, option: &str) -> Option<UrlBuf> {
        let value = self.app.option(option)?;
        let path = value.as_str().filter(|path| !path.is_empty())?;
        let modified = util::modified_secs(self.index_file(path))?;

        let mut url = self.app.urls().index();
        url.append(path).set_query(modified);
        Some(url)
    }

    pub fn css(&self) -> Styles {
        let present = |url: Option<UrlBuf>| url.filter(|url| !url.is_empty());
        Styles {
            index: (!self.dev).then(|| self.asset("css/style.min.css")),
            plugins: present(self.app.plugins().url("css")),
            custom: present(self.custom("panel.css")),
        }
    }

    /// The favicon `<link>`s, keyed by `rel`, each with a `type` and `url`.
    pub fn favicons(&self) -> Result<Dict> {
        match self.app.option("panel.favicon") {
            None | Some(Value::Null) => Ok(dict! {
                "apple-touch-icon" => dict! {
                    "type" => "image/png",
                    "url" => self.asset("apple-touch-icon.png"),
                },
                "alternate icon" => dict! {
                    "type" => "image/png",
                    "url" => self.asset("favicon.png"),
                },
                "shortcut icon" => dict! {
                    "type" => "image/svg+xml",
                    "url" => self.asset("favicon.svg"),
                },
            }),
            Some(Value::Dict(icons)) => Ok((*icons).clone()),
            Some(Value::String(path)) => Ok(dict! {
                "shortcut icon" => dict! {
                    "type" => util::mime_type(self.index_file(&path)),
                    "url" => path,
                },
            }),
            Some(other) => err! {
                "invalid panel.favicon option",
                "expected" => "a table of icons or a path",
                "found" => other.kind(),
            },
        }
    }

    /// The panel's SVG icon sprite without comments.
    pub fn icons(&self) -> Result<String> {
        let dir = if self.dev { "public" } else { "dist" };
        let path = self.app.roots().panel().join(dir).join("img").join("icons.svg");
        let svg: Arc<str> = path.as_path().try_read().chain_with(|| error! {
            "failed to read panel icons",
            "path" => path.display(),
        })?;

        Ok(util::strip_html_comments(&svg))
    }

    pub fn js(&self) -> Scripts {
        let nonce: Arc<str> = self.app.nonce().into();
        let script = |src: Option<UrlBuf>, kind: Option<&'static str>, defer: bool| {
            src.filter(|src| !src.is_empty())
                .map(|src| Script { nonce: nonce.clone(), src, kind, defer })
        };

        let module = Some("module");
        let mut js = Scripts {
            vite: None,
            vue: script(Some(self.asset("js/vue.min.js")), None, false),
            vendor: script(Some(self.asset("js/vendor.min.js")), module, false),
            pluginloader: script(Some(self.asset("js/plugins.js")), module, false),
            plugins: script(self.app.plugins().url("js"), None, true),
            custom: script(self.custom("panel.js"), module, false),
            index: script(Some(self.asset("js/index.min.js")), module, false),
        };

        if self.dev {
            js.vite = script(Some(self.asset("@vite/client")), module, false);
            js.vue = script(Some(self.asset("node_modules/vue/dist/vue.js")), None, false);
            js.vendor = None;
            js.index = script(Some(self.asset("src/index.js")), module, false);
        }

        js
    }

    pub fn external(&self) -> Result<External> {
        Ok(External {
            css: self.css(),
            icons: self.favicons()?,
            plugin_imports: self.app.plugins().read("mjs")?,
            js: self.js(),
        })
    }

    /// Copies the built panel into `<media>/panel/<version hash>` unless it is
    /// already there, then removes the assets of other versions. Returns
    /// whether anything was copied.
    ///
    /// The copy is made in a hidden sibling directory and renamed into place,
    /// so the version directory is either complete or absent.
    pub fn link(&self) -> Result<bool> {
        let target = self.version_root();
        if target.is_dir() {
            tracing::trace!(target = %target.display(), "panel assets already linked");
            return Ok(false);
        }

        let dist = self.app.roots().panel().join("dist");
        let tree = FsTree::build(&dist).chain_with(|| link_error(&dist, &target))?;
        self.install(&tree)
    }

    fn version_root(&self) -> PathBuf {
        self.app.roots().media().join("panel").join(self.app.version_hash())
    }

    /// Copies `tree` into a hidden sibling of the version root, renames the
    /// copy into place, then prunes other versions.
    fn install(&self, tree: &FsTree) -> Result<bool> {
        let target = self.version_root();
        let Some(media) = target.parent() else {
            return Err(link_error(&tree.root().path, &target));
        };

        let failed = || link_error(&tree.root().path, &target);
        fs::create_dir_all(media).chain_with(failed)?;

        let hash = self.app.version_hash();
        let tmp = media.join(format!(".{hash}-{}", &generate_nonce()[..8]));
        let files = match tree.copy_into(&tmp) {
            Ok(files) => files,
            Err(e) => {
                remove_all(&tmp);
                return Err(e.chain(failed()));
            }
        };

        if let Err(e) = fs::rename(&tmp, &target) {
            remove_all(&tmp);
            if target.is_dir() {
                tracing::debug!(target = %target.display(), "panel assets linked concurrently");
                return Ok(false);
            }

            return Err(Error::from(e).chain(failed()));
        }

        for stale in stale_versions(media, &hash) {
            tracing::debug!(path = %stale.display(), "removing stale panel assets");
            remove_all(&stale);
        }

        tracing::info!(target = %target.display(), files, "linked panel assets");
        Ok(true)
    }
}

fn link_error(source: &Path, target: &Path) -> Error {
    error! {
        "panel assets could not be linked",
        "source" => source.display(),
        "target" => target.display(),
    }
}

/// Entries of `media` other than `current` and hidden in-progress copies.
fn stale_versions(media: &Path, current: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(media) else {
        return vec![];
    };

    entries.filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name != current && !name.starts_with('.')
        })
        .map(|entry| entry.path())
        .collect()
}

fn remove_all(path: &Path) {
    let result = match path.is_dir() {
        true => fs::remove_dir_all(path),
        false => fs::remove_file(path),
    };

    if let Err(e) = result {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), "failed to remove: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Request, Settings};

    const HASH_LEN: usize = 32;

    struct Site {
        dir: tempfile::TempDir,
    }

    impl Site {
        fn new() -> Site {
            let site = Site { dir: tempfile::tempdir().unwrap() };
            site.write("panel/dist/css/style.min.css", "body {}");
            site.write("panel/dist/js/index.min.js", "index()");
            site.write("panel/dist/img/icons.svg", "<svg><!-- sprite --><symbol/></svg>");
            site.write("panel/public/img/icons.svg", "<svg><!--dev--></svg>");
            site
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn write(&self, path: &str, contents: &str) {
            let path = self.root().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        fn app(&self, url: &str) -> App {
            let mut settings = Settings { version: Some("4.2.0".into()), ..Default::default() };
            settings.roots.index = self.root().to_path_buf();
            App::new(settings, Request::new(url).with_nonce("n0nce")).with_plugins(())
        }
    }

    #[test]
    fn production_urls() {
        let site = Site::new();
        let app = site.app("https://example.com/panel");
        let assets = Assets::new(&app);

        assert!(!assets.is_dev());
        let base = format!("/media/panel/{}", app.version_hash());
        assert_eq!(assets.url().as_str(), base);
        assert_eq!(app.version_hash().len(), HASH_LEN);

        let css = assets.css();
        assert_eq!(css.index.unwrap().as_str(), format!("{base}/css/style.min.css"));
        assert_eq!((css.plugins, css.custom), (None, None));

        let js = assets.js();
        let names: Vec<_> = js.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["vue", "vendor", "pluginloader", "index"]);
        assert_eq!(js.index.as_ref().unwrap().src.as_str(), format!("{base}/js/index.min.js"));
        assert!(js.iter().all(|(_, script)| &*script.nonce == "n0nce"));
        assert_eq!(js.vendor.as_ref().unwrap().kind, Some("module"));
        assert_eq!(js.vue.as_ref().unwrap().kind, None);
    }

    #[test]
    fn development_urls() {
        let site = Site::new();
        site.write("panel/.vite-running", "");

        let app = site.app("https://example.com:8080/panel/site?tab=1");
        let assets = Assets::new(&app);
        assert!(assets.is_dev());
        assert_eq!(assets.url().as_str(), "https://example.com:3000");
        assert_eq!(assets.css().index, None);

        let js = assets.js();
        let names: Vec<_> = js.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["vite", "vue", "pluginloader", "index"]);
        assert_eq!(js.vite.unwrap().src.as_str(), "https://example.com:3000/@vite/client");
        assert_eq!(js.index.unwrap().src.as_str(), "https://example.com:3000/src/index.js");
        assert_eq!(assets.icons().unwrap(), "<svg></svg>");

        let mut app = site.app("/panel");
        app.set_option("panel.dev", "http://vite.test:5173/");
        assert_eq!(Assets::new(&app).url().as_str(), "http://vite.test:5173/");

        app.set_option("panel.dev", false);
        assert!(!Assets::new(&app).is_dev());
    }

    #[test]
    fn custom_assets() {
        let site = Site::new();
        site.write("assets/panel.css", ".custom {}");

        let mut app = site.app("/panel");
        app.set_option("panel.css", "assets/panel.css");
        app.set_option("panel.js", "assets/missing.js");

        let assets = Assets::new(&app);
        let css = assets.css().custom.unwrap();
        assert!(css.as_str().starts_with("/assets/panel.css?"));
        assert!(assets.js().custom.is_none());
    }

    #[test]
    fn custom_assets_with_leading_slash() {
        let site = Site::new();
        site.write("assets/panel.css", ".custom {}");

        let mut app = site.app("/panel");
        app.set_option("panel.css", "/assets/panel.css");
        app.set_option("panel.js", "/assets/missing.js");

        let assets = Assets::new(&app);
        let css = assets.css().custom.unwrap();
        assert!(css.as_str().starts_with("/assets/panel.css?"));
        assert!(!css.as_str().contains("//"));
        assert!(assets.js().custom.is_none());
    }

    #[test]
    fn favicons() {
        let site = Site::new();
        let mut app = site.app("/panel");

        let icons = Assets::new(&app).favicons().unwrap();
        assert_eq!(icons.len(), 3);
        assert_eq!(icons["shortcut icon"].as_dict().unwrap()["type"], Value::from("image/svg+xml"));

        app.set_option("panel.favicon", "assets/favicon.ico");
        let icons = Assets::new(&app).favicons().unwrap();
        assert_eq!(icons.len(), 1);
        assert_eq!(icons["shortcut icon"], Value::from(dict! {
            "type" => "image/x-icon",
            "url" => "assets/favicon.ico",
        }));

        let custom = dict! { "icon" => dict! { "type" => "image/png", "url" => "/a.png" } };
        app.set_option("panel.favicon", custom.clone());
        assert_eq!(Assets::new(&app).favicons().unwrap(), custom);

        // The file's bytes win over its extension.
        fs::create_dir_all(site.root().join("assets")).unwrap();
        fs::write(site.root().join("assets/logo.ico"), b"\x89PNG\r\n\x1a\n").unwrap();
        app.set_option("panel.favicon", "/assets/logo.ico");
        let icons = Assets::new(&app).favicons().unwrap();
        assert_eq!(icons["shortcut icon"], Value::from(dict! {
            "type" => "image/png",
            "url" => "/assets/logo.ico",
        }));

        app.set_option("panel.favicon", 7u8);
        let error = Assets::new(&app).favicons().unwrap_err();
        assert_eq!(error.message(), "invalid panel.favicon option");
    }

    #[test]
    fn favicons_keep_configured_order() {
        let site = Site::new();
        let mut app = site.app("/panel");
        let keys = |app: &App| -> Vec<String> {
            Assets::new(app).favicons().unwrap().keys().map(|k| k.to_string()).collect()
        };

        assert_eq!(keys(&app), ["apple-touch-icon", "alternate icon", "shortcut icon"]);

        let icons: Value = toml::from_str(r#"
            [icons."shortcut icon"]
            type = "image/svg+xml"
            url = "/favicon.svg"

            [icons."alternate icon"]
            type = "image/png"
            url = "/favicon.png"
        "#).unwrap();

        app.set_option("panel.favicon", icons.as_dict().unwrap()["icons"].clone());
        assert_eq!(keys(&app), ["shortcut icon", "alternate icon"]);
    }

    #[test]
    fn icons_without_comments() {
        let site = Site::new();
        let app = site.app("/panel");
        assert_eq!(Assets::new(&app).icons().unwrap(), "<svg><symbol/></svg>");
    }

    #[test]
    fn external_bundle() {
        let site = Site::new();
        let app = site.app("/panel");
        let external = Assets::new(&app).external().unwrap();
        assert_eq!(external.plugin_imports, "");

        let json = serde_json::to_value(&external).unwrap();
        assert!(json["plugin-imports"].is_string());
        assert!(json["css"]["index"].is_string());
        assert!(json["css"].get("custom").is_none());
        assert_eq!(json["js"]["index"]["type"], "module");
        assert!(json["js"]["vue"].get("defer").is_none());
    }

    #[test]
    fn link_copies_once_and_prunes() {
        let site = Site::new();
        site.write("media/panel/0123456789abcdef/css/old.css", "old");
        let app = site.app("/panel");
        let assets = Assets::new(&app);

        let target = site.root().join("media/panel").join(app.version_hash());
        assert!(assets.link().unwrap());
        assert_eq!(fs::read_to_string(target.join("js/index.min.js")).unwrap(), "index()");
        assert!(!site.root().join("media/panel/0123456789abcdef").exists());

        site.write("panel/dist/js/index.min.js", "changed()");
        assert!(!assets.link().unwrap());
        assert_eq!(fs::read_to_string(target.join("js/index.min.js")).unwrap(), "index()");

        let entries: Vec<_> = fs::read_dir(site.root().join("media/panel")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn failed_link_keeps_existing_versions() {
        let site = Site::new();
        fs::remove_dir_all(site.root().join("panel/dist")).unwrap();
        site.write("media/panel/0123456789abcdef/css/old.css", "old");

        let app = site.app("/panel");
        let error = Assets::new(&app).link().unwrap_err();
        assert_eq!(error.message(), "panel assets could not be linked");
        assert!(site.root().join("media/panel/0123456789abcdef/css/old.css").is_file());

        let entries: Vec<_> = fs::read_dir(site.root().join("media/panel")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn interrupted_copy_leaves_no_partial_version() {
        let site = Site::new();
        site.write("media/panel/0123456789abcdef/css/old.css", "old");
        let app = site.app("/panel");
        let assets = Assets::new(&app);

        // The file disappears between discovery and copy.
        let tree = FsTree::build(site.root().join("panel/dist")).unwrap();
        fs::remove_file(site.root().join("panel/dist/js/index.min.js")).unwrap();

        let error = assets.install(&tree).unwrap_err();
        assert_eq!(error.message(), "panel assets could not be linked");
        assert!(error.to_string().contains("index.min.js"));
        assert!(!site.root().join("media/panel").join(app.version_hash()).exists());
        assert!(site.root().join("media/panel/0123456789abcdef/css/old.css").is_file());

        let entries: Vec<_> = fs::read_dir(site.root().join("media/panel")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_dist_entries_fail_the_link() {
        let site = Site::new();
        let dist = site.root().join("panel/dist");
        std::os::unix::fs::symlink(dist.join("js/missing.js"), dist.join("js/vendor.min.js")).unwrap();

        let app = site.app("/panel");
        let error = Assets::new(&app).link().unwrap_err();
        assert_eq!(error.message(), "panel assets could not be linked");
        assert!(!site.root().join("media/panel").join(app.version_hash()).exists());
    }
}
