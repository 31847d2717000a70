//! The panel's shell: its main menu and the assets its HTML references.

mod area;
mod menu;
mod assets;
mod plugins;

pub use area::*;
pub use menu::*;
pub use assets::*;
pub use plugins::*;
