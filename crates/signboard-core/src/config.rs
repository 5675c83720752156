//! Signage configuration types.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the display surface is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// One full-viewport page.
    Single,
    /// Two panes side by side.
    SplitHorizontal,
    /// Two panes stacked.
    SplitVertical,
}

impl DisplayMode {
    /// Parse the stored string form.
    ///
    /// Only the three enumerated values are accepted. Anything else is a
    /// validation failure, never an implicit split.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "single" => Ok(DisplayMode::Single),
            "split-horizontal" => Ok(DisplayMode::SplitHorizontal),
            "split-vertical" => Ok(DisplayMode::SplitVertical),
            other => Err(ConfigError::UnknownDisplayMode(other.to_string())),
        }
    }

    /// The stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Single => "single",
            DisplayMode::SplitHorizontal => "split-horizontal",
            DisplayMode::SplitVertical => "split-vertical",
        }
    }

    /// Whether this mode shows two panes.
    pub fn is_split(&self) -> bool {
        !matches!(self, DisplayMode::Single)
    }

    /// Pane layout for split modes, `None` for single.
    pub fn orientation(&self) -> Option<SplitOrientation> {
        match self {
            DisplayMode::Single => None,
            DisplayMode::SplitHorizontal => Some(SplitOrientation::Horizontal),
            DisplayMode::SplitVertical => Some(SplitOrientation::Vertical),
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pane layout of a split-mode display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOrientation {
    /// Panes in a row (left / right).
    Horizontal,
    /// Panes in a column (top / bottom).
    Vertical,
}

/// A stored signage configuration.
///
/// Equality is full structural equality, timestamps included: an in-place
/// update bumps `updated_at` and is therefore detected as a change even when
/// every user-facing field is identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignageConfig {
    pub id: i64,
    pub name: String,
    pub display_mode: DisplayMode,
    pub primary_url: String,
    pub secondary_url: Option<String>,
    pub refresh_interval_secs: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl SignageConfig {
    /// Check the mode/secondary-URL invariant.
    ///
    /// Split modes require a non-empty `secondary_url`. A config that
    /// violates this is rejected before it can reach a renderer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.primary_url.is_empty() {
            return Err(ConfigError::Invalid {
                id: self.id,
                reason: "primary_url is empty".to_string(),
            });
        }

        if self.display_mode.is_split() {
            match self.secondary_url.as_deref() {
                Some(url) if !url.is_empty() => {}
                _ => {
                    return Err(ConfigError::Invalid {
                        id: self.id,
                        reason: format!(
                            "display_mode {} requires a secondary_url",
                            self.display_mode
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// The secondary URL, guaranteed present after [`validate`](Self::validate)
    /// for split modes.
    pub fn secondary_url(&self) -> Option<&str> {
        self.secondary_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Fields for creating or updating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConfig {
    pub name: String,
    pub display_mode: DisplayMode,
    pub primary_url: String,
    #[serde(default)]
    pub secondary_url: Option<String>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u32,
}

fn default_refresh_interval() -> u32 {
    NewConfig::DEFAULT_REFRESH_INTERVAL_SECS
}

impl NewConfig {
    /// Default refresh interval, in seconds.
    pub const DEFAULT_REFRESH_INTERVAL_SECS: u32 = 300;
}
