//! The demo components.

use compound_config::prelude::*;
use compound_system::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Database
// ─────────────────────────────────────────────────────────────────────────────

/// A pretend connection pool.
#[derive(Debug, Default, Configurable)]
pub struct Database {
    /// Connection URL.
    #[config(key = "connection.url")]
    pub url: String,
    /// Pool size; keeps its default when unset.
    #[config(key = "connection.pool_size", required = false)]
    pub pool_size: u32,
    /// Whether the pool is open.
    pub connected: bool,
}

impl Database {
    /// A database with the default pool size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool_size: 4,
            ..Self::default()
        }
    }
}

impl Lifecycle for Database {
    fn load(&mut self) -> Result<(), ComponentError> {
        if !self.url.contains("://") {
            return Err(format!("'{}' is not a connection URL", self.url).into());
        }
        tracing::info!(url = %self.url, pool_size = self.pool_size, "database connected");
        self.connected = true;
        Ok(())
    }

    fn unload(&mut self) -> Result<(), ComponentError> {
        tracing::info!(url = %self.url, "database disconnected");
        self.connected = false;
        Ok(())
    }
}

impl Component for Database {
    fn lifecycle(&mut self) -> Option<&mut dyn Lifecycle> {
        Some(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Greeter
// ─────────────────────────────────────────────────────────────────────────────

/// Greets players with a colored message.
#[derive(Debug, Default, Configurable)]
pub struct Greeter {
    /// The greeting, with `&` color codes translated.
    #[config(colorize)]
    pub message: String,
    /// Seconds between repeated greetings.
    #[config(key = "repeat.every", required = false)]
    pub repeat_every: f64,
}

impl Component for Greeter {}

// ─────────────────────────────────────────────────────────────────────────────
// Theme
// ─────────────────────────────────────────────────────────────────────────────

/// An RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Parses `#RRGGBB` strings into a [`Color`].
#[derive(Debug, Default)]
pub struct HexColor;

impl Resolver for HexColor {
    type Input = String;
    type Output = Color;

    fn apply(&self, input: String) -> Result<Color, ResolveError> {
        let Some(hex) = input
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
        else {
            return Err(ResolveError::rejected(format!("'{input}' is not #RRGGBB")));
        };
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .map_err(|err| ResolveError::rejected(format!("'{input}': {err}")))
        };
        Ok(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Colors shared by the other components. Reads its own file.
#[derive(Debug, Configurable)]
#[config(path = "theme.json")]
pub struct Theme {
    /// Primary color.
    #[config(resolver = HexColor)]
    pub primary: Color,
    /// Accent color; white unless configured.
    #[config(resolver = HexColor, required = false)]
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::default(),
            accent: Color {
                r: 0xFF,
                g: 0xFF,
                b: 0xFF,
            },
        }
    }
}

impl Component for Theme {}

// ─────────────────────────────────────────────────────────────────────────────
// Shop
// ─────────────────────────────────────────────────────────────────────────────

/// Sells items through an economy component that is never installed.
#[derive(Debug, Default, Configurable)]
pub struct Shop;

impl Component for Shop {}
