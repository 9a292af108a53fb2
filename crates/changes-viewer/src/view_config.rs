//! Persisted view configuration: layout style and line wrapping.
//!
//! Values are read once when the store is loaded and written through on
//! every change. The in-memory copy is updated first, so a read right after
//! a set always sees the new value even if the write fails.

use crate::traits::PreferenceStore;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const VIEW_STYLE_KEY: &str = "diff.view_style";
const LINE_BREAKS_KEY: &str = "diff.line_breaks";

/// How changed files are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LayoutStyle {
    /// Old and new content in two columns.
    #[default]
    SideBySide,
    /// Old and new content interleaved in one column.
    Unified,
}

impl LayoutStyle {
    /// The persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutStyle::SideBySide => "side-by-side",
            LayoutStyle::Unified => "line-by-line",
        }
    }
}

impl fmt::Display for LayoutStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutStyle {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "side-by-side" => Ok(LayoutStyle::SideBySide),
            "line-by-line" | "unified" => Ok(LayoutStyle::Unified),
            other => Err(PreferenceError::InvalidValue {
                key: VIEW_STYLE_KEY,
                value: other.to_string(),
            }),
        }
    }
}

/// A persisted value that does not match its expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("invalid value {value:?} for preference {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// The two persisted view settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewConfiguration {
    pub layout_style: LayoutStyle,
    pub line_breaks_enabled: bool,
}

/// Keys understood by [`ViewConfigStore::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceKey {
    LayoutStyle,
    LineBreaks,
}

impl PreferenceKey {
    /// Fully qualified storage key.
    pub fn storage_key(&self) -> &'static str {
        match self {
            PreferenceKey::LayoutStyle => VIEW_STYLE_KEY,
            PreferenceKey::LineBreaks => LINE_BREAKS_KEY,
        }
    }
}

/// A typed preference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    LayoutStyle(LayoutStyle),
    LineBreaks(bool),
}

impl Preference {
    pub fn key(&self) -> PreferenceKey {
        match self {
            Preference::LayoutStyle(_) => PreferenceKey::LayoutStyle,
            Preference::LineBreaks(_) => PreferenceKey::LineBreaks,
        }
    }

    fn storage_value(&self) -> String {
        match self {
            Preference::LayoutStyle(style) => style.as_str().to_string(),
            Preference::LineBreaks(enabled) => enabled.to_string(),
        }
    }
}

/// Cached, write-through handle over a [`PreferenceStore`].
#[derive(Debug)]
pub struct ViewConfigStore<S> {
    store: S,
    config: ViewConfiguration,
}

impl<S: PreferenceStore> ViewConfigStore<S> {
    /// Read both preferences from `store`, falling back to defaults.
    pub fn load(store: S) -> Self {
        let config = ViewConfiguration {
            layout_style: read_or_default(&store, VIEW_STYLE_KEY, |v| v.parse()),
            line_breaks_enabled: read_or_default(&store, LINE_BREAKS_KEY, parse_bool),
        };
        log::debug!("Loaded view configuration: {:?}", config);
        Self { store, config }
    }

    /// Current configuration.
    pub fn config(&self) -> ViewConfiguration {
        self.config
    }

    pub fn get(&self, key: PreferenceKey) -> Preference {
        match key {
            PreferenceKey::LayoutStyle => Preference::LayoutStyle(self.config.layout_style),
            PreferenceKey::LineBreaks => Preference::LineBreaks(self.config.line_breaks_enabled),
        }
    }

    /// Update the in-memory value, then write it through.
    pub fn set(&mut self, preference: Preference) {
        match preference {
            Preference::LayoutStyle(style) => self.config.layout_style = style,
            Preference::LineBreaks(enabled) => self.config.line_breaks_enabled = enabled,
        }

        let key = preference.key().storage_key();
        if let Err(e) = self.store.set(key, &preference.storage_value()) {
            log::error!("Failed to persist preference {}: {:#}", key, e);
        }
    }

    pub fn layout_style(&self) -> LayoutStyle {
        self.config.layout_style
    }

    pub fn set_layout_style(&mut self, style: LayoutStyle) {
        self.set(Preference::LayoutStyle(style));
    }

    pub fn line_breaks_enabled(&self) -> bool {
        self.config.line_breaks_enabled
    }

    pub fn set_line_breaks_enabled(&mut self, enabled: bool) {
        self.set(Preference::LineBreaks(enabled));
    }

    /// Flip line wrapping and return the new value.
    pub fn toggle_line_breaks(&mut self) -> bool {
        let enabled = !self.config.line_breaks_enabled;
        self.set_line_breaks_enabled(enabled);
        enabled
    }
}

fn parse_bool(value: &str) -> Result<bool, PreferenceError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(PreferenceError::InvalidValue {
            key: LINE_BREAKS_KEY,
            value: other.to_string(),
        }),
    }
}

fn read_or_default<S, T, F>(store: &S, key: &str, parse: F) -> T
where
    S: PreferenceStore,
    T: Default,
    F: FnOnce(&str) -> Result<T, PreferenceError>,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };

    parse(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring corrupted preference, using default: {}", e);
        T::default()
    })
}
