pub mod minijinja;

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Result, Chainable};
use crate::value::{Dict, Source};

pub trait EngineInit {
    type Engine: Engine + 'static;

    /// Creates an engine that resolves `include`s and `extends` against
    /// `root`, with `globals` available to every template as `G`.
    fn init<G: Serialize>(root: Option<&Path>, globals: G) -> Self::Engine;
}

pub trait Engine: Send + Sync + Debug {
    fn render_str(
        &self,
        name: Option<&str>,
        template_str: &str,
        context: &Dict,
    ) -> Result<String>;

    /// Renders the template file at `path`. The file is read in full before
    /// rendering begins.
    fn render_file(&self, path: &Path, context: &Dict) -> Result<String> {
        let template: Arc<str> = path.try_read().chain_with(|| error! {
            "failed to read template",
            "path" => path.display(),
        })?;

        let name = path.to_string_lossy();
        self.render_str(Some(&name), &template, context)
    }
}
