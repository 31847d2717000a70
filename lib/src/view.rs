use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::templating::Engine;
use crate::templating::minijinja::MiniJinjaEngine;
use crate::value::Dict;

static DEFAULT_ENGINE: Lazy<Arc<MiniJinjaEngine>> = Lazy::new(|| Arc::new(MiniJinjaEngine::default()));

/// A template file bound to data, rendered into a string on demand.
///
/// ```rust,no_run
/// use atrium::{dict, View};
///
/// let view = View::new("templates/hello.html", dict! { "name" => "Homer" });
/// println!("{}", view.render(None).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct View {
    file: PathBuf,
    data: Dict,
    engine: Arc<dyn Engine>,
}

impl View {
    pub fn new<P: Into<PathBuf>>(file: P, data: Dict) -> View {
        View { file: file.into(), data, engine: DEFAULT_ENGINE.clone() }
    }

    /// Renders with `engine` instead of the shared default engine.
    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> View {
        self.engine = engine;
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn data(&self) -> &Dict {
        &self.data
    }

    /// Whether the template names a regular file that can be opened.
    pub fn exists(&self) -> bool {
        self.file.is_file() && File::open(&self.file).is_ok()
    }

    /// Renders the template with `extra` merged over the bound data.
    ///
    /// Errors raised while rendering are returned as-is; no partial output is
    /// ever returned.
    pub fn render(&self, extra: Option<&Dict>) -> Result<String> {
        if !self.exists() {
            return err! {
                "template file not found",
                "path" => self.file.display(),
            };
        }

        let data = match extra {
            Some(extra) if !extra.is_empty() => {
                let mut data = self.data.clone();
                data.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
                std::borrow::Cow::Owned(data)
            }
            _ => std::borrow::Cow::Borrowed(&self.data),
        };

        tracing::trace!(file = %self.file.display(), keys = data.len(), "rendering view");
        self.engine.render_file(&self.file, &data)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render(None) {
            Ok(string) => f.write_str(&string),
            Err(e) => {
                tracing::error!(file = %self.file.display(), "view failed to render:\n{e}");
                Err(fmt::Error)
            }
        }
    }
}
