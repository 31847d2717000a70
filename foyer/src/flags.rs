use std::path::PathBuf;

xflags::xflags! {
    /// Inspect and prepare a site's admin panel.
    cmd foyer {
        /// Configuration file. Defaults to `foyer.toml` when present.
        optional -c, --config path: PathBuf

        /// Link the built panel assets into the media folder.
        cmd link {}

        /// Print the panel menu as JSON.
        cmd menu {
            /// URL of the request being served.
            optional --url url: String
            /// Id of the current area.
            optional --current id: String
        }

        /// Print the panel's stylesheets, scripts, and icons as JSON.
        cmd assets {
            /// URL of the request being served.
            optional --url url: String
        }

        /// Render a template file.
        cmd render {
            required template: PathBuf
            /// TOML or JSON file with the template's data.
            optional -d, --data path: PathBuf
        }
    }
}
