use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, Chainable};
use crate::fstree::FsTree;
use crate::url::UrlBuf;
use crate::util;
use crate::value::Source;

/// Bundles the plugin-provided panel assets of one type (`css`, `js`, or
/// `mjs`).
pub trait PluginAssets: Send + Sync + Debug {
    /// The public URL of the bundle, if any plugin contributes to it.
    fn url(&self, extension: &str) -> Option<UrlBuf>;

    /// The bundle's contents. Empty when no plugin contributes to it.
    fn read(&self, extension: &str) -> Result<String>;
}

/// No plugins.
impl PluginAssets for () {
    fn url(&self, _: &str) -> Option<UrlBuf> {
        None
    }

    fn read(&self, _: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// Plugins laid out on disk as `<root>/<plugin>/index.<extension>`.
///
/// Bundles are served from `<media>/plugins/index.<extension>`, queried by
/// the newest modification time of the bundled files.
#[derive(Debug, Clone)]
pub struct Plugins {
    root: PathBuf,
    media_url: UrlBuf,
}

impl Plugins {
    pub fn new<P: Into<PathBuf>>(root: P, media_url: UrlBuf) -> Plugins {
        Plugins { root: root.into(), media_url }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The files bundled for `extension`, ordered by plugin name.
    pub fn files(&self, extension: &str) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(vec![]);
        }

        let index = format!("index.{extension}");
        let tree = FsTree::build(&self.root)?;
        let files = tree.children(tree.root_id())
            .filter(|plugin| plugin.file_type.is_dir())
            .filter_map(|plugin| tree.get_file_id(plugin.id, &index))
            .map(|id| tree[id].path.to_path_buf())
            .collect();

        Ok(files)
    }
}

impl PluginAssets for Plugins {
    fn url(&self, extension: &str) -> Option<UrlBuf> {
        let files = self.files(extension)
            .map_err(|e| tracing::warn!(root = %self.root.display(), "plugin discovery failed:\n{e}"))
            .ok()?;

        let modified = files.iter().filter_map(util::modified_secs).max()?;
        let bundle = format!("index.{extension}");
        let mut url = self.media_url.clone();
        url.extend(["plugins", bundle.as_str()]).set_query(modified);
        Some(url)
    }

    fn read(&self, extension: &str) -> Result<String> {
        let contents = self.files(extension)?
            .iter()
            .map(|path| path.try_read::<Arc<str>>().chain_with(|| error! {
                "failed to read plugin asset",
                "path" => path.display(),
            }))
            .collect::<Result<Vec<_>>>()?;

        Ok(contents.join("\n"))
    }
}
