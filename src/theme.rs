use serde::{Deserialize, Serialize};

const LIGHT_BACKGROUND: &str = "#ffffff";
const LIGHT_TEXT: &str = "#000000";
const LIGHT_MUTED_TEXT: &str = "#666666";
const LIGHT_NEUTRAL_LIGHT: &str = "#cccccc";
const LIGHT_NEUTRAL_DARK: &str = "#000000";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("dark", include_str!("../themes/dark.toml")),
    ("light", include_str!("../themes/light.toml")),
];

const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f64 = 10.0;

/// Palette the timeline style is derived from.
///
/// `neutral_light` and `neutral_dark` are the theme's light and dark greys;
/// gridlines take whichever sits closer to the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_text")]
    pub text_color: String,
    #[serde(default = "default_muted_text")]
    pub muted_text_color: String,
    #[serde(default = "default_neutral_light")]
    pub neutral_light: String,
    #[serde(default = "default_neutral_dark")]
    pub neutral_dark: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

fn default_background() -> String {
    LIGHT_BACKGROUND.to_string()
}
fn default_text() -> String {
    LIGHT_TEXT.to_string()
}
fn default_muted_text() -> String {
    LIGHT_MUTED_TEXT.to_string()
}
fn default_neutral_light() -> String {
    LIGHT_NEUTRAL_LIGHT.to_string()
}
fn default_neutral_dark() -> String {
    LIGHT_NEUTRAL_DARK.to_string()
}
fn default_font_family() -> String {
    FONT_FAMILY.to_string()
}
fn default_font_size() -> f64 {
    FONT_SIZE
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
    #[serde(default)]
    bright: Option<AlacrittyBright>,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    black: String,
    white: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyBright {
    black: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl Theme {
    /// White canvas, black axis, light grey grid.
    pub fn light() -> Self {
        Theme {
            background_color: LIGHT_BACKGROUND.to_string(),
            text_color: LIGHT_TEXT.to_string(),
            muted_text_color: LIGHT_MUTED_TEXT.to_string(),
            neutral_light: LIGHT_NEUTRAL_LIGHT.to_string(),
            neutral_dark: LIGHT_NEUTRAL_DARK.to_string(),
            font_family: FONT_FAMILY.to_string(),
            font_size: FONT_SIZE,
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, String> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                format!(
                    "Unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                )
            })?;
        Self::from_alacritty_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty YAML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty TOML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    /// Parses a theme file, trying TOML first and then YAML.
    pub fn from_alacritty(content: &str) -> Result<Self, String> {
        Self::from_alacritty_toml(content)
            .or_else(|_| Self::from_alacritty_yaml(content))
            .map_err(|_| "Failed to parse theme file as TOML or YAML".to_string())
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;
        let muted = colors
            .bright
            .map(|bright| bright.black)
            .unwrap_or_else(|| colors.primary.foreground.clone());

        Theme {
            background_color: colors.primary.background,
            text_color: colors.primary.foreground,
            muted_text_color: muted,
            neutral_light: colors.normal.white,
            neutral_dark: colors.normal.black,
            font_family: FONT_FAMILY.to_string(),
            font_size: FONT_SIZE,
        }
    }
}
