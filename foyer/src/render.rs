use std::path::Path;
use std::sync::Arc;

use atrium::View;
use atrium::error::Result;
use atrium::templating::EngineInit;
use atrium::templating::minijinja::MiniJinjaEngine;
use atrium::value::{Dict, Format, Json, Toml};

use crate::config::Config;

/// Reads template data from a JSON file, or from TOML otherwise.
pub fn read_data(path: &Path) -> Result<Dict> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext == Json::EXTENSION => Json::read(path),
        _ => Toml::read(path),
    }
}

/// Renders `template` with includes resolved next to it and the configured
/// options available as `G`.
pub fn render(config: &Config, template: &Path, data: Option<&Path>) -> Result<String> {
    let data = match data {
        Some(path) => read_data(path)?,
        None => Dict::new(),
    };

    let engine = MiniJinjaEngine::init(template.parent(), &config.settings.options);
    View::new(template, data)
        .with_engine(Arc::new(engine))
        .render(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_includes_and_globals() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, contents: &str| std::fs::write(dir.path().join(name), contents).unwrap();
        write("page.html", "{% include 'title.html' %}: {{ kids | join(', ') }}");
        write("title.html", "{{ G.site }}");
        write("data.json", r#"{ "kids": ["Bart", "Lisa"] }"#);
        write("data.toml", "kids = [\"Maggie\"]");

        let mut config = Config::default();
        config.settings.options.insert("site".into(), "Springfield".into());

        let page = dir.path().join("page.html");
        let html = render(&config, &page, Some(&dir.path().join("data.json"))).unwrap();
        assert_eq!(html, "Springfield: Bart, Lisa");

        let html = render(&config, &page, Some(&dir.path().join("data.toml"))).unwrap();
        assert_eq!(html, "Springfield: Maggie");
    }
}
