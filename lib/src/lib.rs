#![doc = svgbobdoc::transform!(
//! The web layer of a content management system's admin panel.
//!
//! # Overview
//!
//! Atrium turns host configuration, permissions, and file-system state into
//! the pieces of the panel's HTML shell: the main menu, the stylesheets,
//! scripts, and icons the shell references, and server-side rendered views.
//!
//! Every component reads the host through one explicit context, the [`App`]:
//!
//! ```svgbob
//!                     +----------------------------------+
//!                     |               App                |
//!                     | roots, urls, options, request,   |
//!                     | translations, plugin assets      |
//!                     +---+-------------+-------------+--+
//!                         |             |             |
//!            +------------+--+   +------+-----+   +---+--+
//!            |     Menu      |   |   Assets   |   | View |
//!            +-------+-------+   +------+-----+   +---+--+
//!                    |                  |             |
//!   areas, permissions, current    media/panel/<v>    template + data
//! ```
//!
//!   * A **[`Menu`](panel::Menu)** merges the `panel.menu` option with the
//!     host's registered [areas](panel::Area), filters them by permission,
//!     and marks the current one. Its entries serialize to the JSON the
//!     panel's front end expects.
//!
//!   * **[`Assets`](panel::Assets)** resolve asset URLs against either the
//!     versioned media folder or a running development server, and
//!     [link](panel::Assets::link()) the built panel into the media folder
//!     once per version.
//!
//!   * A **[`View`]** renders a template file with bound data.
//!
//! Options may be plain configuration values or callbacks computed on read;
//! see [`Computed`].
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod fstree;
pub mod value;
pub mod url;
pub mod computed;
pub mod app;
pub mod templating;
pub mod panel;
pub mod view;

pub use app::App;
pub use computed::Computed;
pub use view::View;
