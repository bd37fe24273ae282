//! Markup color-code translation applied to `colorize`d string fields.

/// Translates color markup in configured strings.
///
/// Any `Fn(&str) -> String` closure is a translator.
pub trait ColorTranslator: Send + Sync {
    /// Returns `text` with its color markup translated.
    fn translate(&self, text: &str) -> String;
}

impl<F> ColorTranslator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, text: &str) -> String {
        self(text)
    }
}

/// The section sign that introduces a formatting code in translated text.
pub const SECTION_SIGN: char = '\u{00A7}';

/// Formatting codes recognised after the marker character.
const CODES: &str = "0123456789AaBbCcDdEeFfKkLlMmNnOoRrXx";

/// Rewrites `<marker><code>` pairs into `§<code>`, lowercasing the code.
///
/// A marker not followed by a known code is left alone.
///
/// # Example
///
/// ```
/// use compound_config::colorize::{AlternateColorCodes, ColorTranslator};
///
/// let colors = AlternateColorCodes::default();
/// assert_eq!(colors.translate("&cHello"), "\u{00A7}cHello");
/// assert_eq!(colors.translate("R&Z"), "R&Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlternateColorCodes {
    marker: char,
}

impl AlternateColorCodes {
    /// Creates a translator using `marker` as the alternate code character.
    #[must_use]
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    /// Returns the marker character.
    #[must_use]
    pub fn marker(&self) -> char {
        self.marker
    }
}

impl Default for AlternateColorCodes {
    fn default() -> Self {
        Self::new('&')
    }
}

impl ColorTranslator for AlternateColorCodes {
    fn translate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match chars.peek() {
                Some(&code) if c == self.marker && CODES.contains(code) => {
                    out.push(SECTION_SIGN);
                    out.push(code.to_ascii_lowercase());
                    chars.next();
                }
                _ => out.push(c),
            }
        }

        out
    }
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbatim;

impl ColorTranslator for Verbatim {
    fn translate(&self, text: &str) -> String {
        text.to_owned()
    }
}
