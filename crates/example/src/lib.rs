//! Example components loaded by a Compound host.
//!
//! The demo installs four components:
//!
//! ```text
//! database ◀── greeter
//! theme
//! shop ──▶ economy (not installed)
//! ```
//!
//! `greeter` loads once `database` has loaded, `theme` loads on its own,
//! and `shop` fails because its dependency is missing. Configuration comes
//! from JSON files in the data folder; [`write_sample_config`] writes a set.

mod components;

pub use components::{Color, Database, Greeter, HexColor, Shop, Theme};

use compound_system::prelude::*;
use serde_json::json;
use std::path::Path;

/// The demo components as a group.
///
/// # Example
///
/// ```
/// use compound_system::prelude::*;
/// use example::DemoComponents;
///
/// let group = DemoComponents.build().disable("shop");
/// assert_eq!(group.names().collect::<Vec<_>>(), ["database", "greeter", "theme"]);
/// ```
pub struct DemoComponents;

impl ComponentGroup for DemoComponents {
    fn build(self) -> ComponentGroupBuilder {
        ComponentGroupBuilder::new()
            .add(
                ComponentDescriptor::new("database", || Ok(Database::new()))
                    .with_description("Connection pool"),
            )
            .add(
                ComponentDescriptor::of::<Greeter>("greeter")
                    .with_description("Greets players on join")
                    .with_config_path("messages.json")
                    .with_base_key("greeter")
                    .depends_on("database"),
            )
            .add(ComponentDescriptor::of::<Theme>("theme").with_description("Shared colors"))
            .add(
                ComponentDescriptor::of::<Shop>("shop")
                    .with_description("Item shop")
                    .depends_on("economy"),
            )
    }
}

/// Writes sample configuration files for the demo components into `data`.
///
/// Existing files are left untouched.
///
/// # Errors
///
/// Returns an I/O error if a file cannot be written.
pub fn write_sample_config(data: &Path) -> std::io::Result<()> {
    let samples = [
        (
            "database.json",
            json!({ "connection": { "url": "postgres://localhost/compound", "pool_size": 8 } }),
        ),
        (
            "messages.json",
            json!({ "greeter": { "message": "&aWelcome, &eadventurer&a!", "repeat": { "every": 300 } } }),
        ),
        ("theme.json", json!({ "primary": "#3366FF" })),
    ];

    std::fs::create_dir_all(data)?;
    for (file, contents) in samples {
        let path = data.join(file);
        if path.exists() {
            continue;
        }
        let text = serde_json::to_string_pretty(&contents).map_err(std::io::Error::other)?;
        std::fs::write(&path, text)?;
        tracing::debug!(path = %path.display(), "wrote sample config");
    }
    Ok(())
}
