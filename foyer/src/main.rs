use std::io;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use atrium::error::Result;
use atrium::panel::{Assets, Menu};
use atrium::value::Sink;

use crate::config::Config;
use crate::flags::{Foyer, FoyerCmd};

mod config;
mod flags;
mod render;

pub const CONFIG_FILE: &str = "foyer.toml";

/// Request URL used when none is given.
const PANEL_URL: &str = "/panel";

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Foyer::from_env_or_exit()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(flags: Foyer) -> Result<()> {
    let config = Config::read(flags.config.as_deref())?;
    match flags.subcommand {
        FoyerCmd::Link(_) => {
            let app = config.app(PANEL_URL);
            match Assets::new(&app).link()? {
                true => println!("linked panel assets for {}", app.version()),
                false => println!("panel assets for {} are up to date", app.version()),
            }
        }
        FoyerCmd::Menu(cmd) => {
            let app = config.app(cmd.url.as_deref().unwrap_or(PANEL_URL));
            let menu = Menu::new(&app, &config.areas, &config.permissions, cmd.current.as_deref());
            print_json(&menu.entries()?)?;
        }
        FoyerCmd::Assets(cmd) => {
            let app = config.app(cmd.url.as_deref().unwrap_or(PANEL_URL));
            print_json(&Assets::new(&app).external()?)?;
        }
        FoyerCmd::Render(cmd) => {
            let html = render::render(&config, &cmd.template, cmd.data.as_deref())?;
            io::stdout().write(html)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
