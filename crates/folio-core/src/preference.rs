//! Visual preference store
//!
//! Holds the light/dark mode, the accent scheme and the sidebar toggle.
//! Mode and accent are persisted on every mutation; storage failures are
//! logged and otherwise ignored, since a lost preference only costs the
//! user a re-toggle.
//!
//! Subscribers receive the new preference through a `watch` channel
//! before the mutating call returns, so the presentation layer can swap
//! the root class ahead of its next paint.

use crate::storage::{read_lenient, KeyValueStore, COLOR_SCHEME_KEY, THEME_KEY};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

/// Light or dark rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Stored/wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other mode
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme mode: {other}")),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accent color scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    #[default]
    Teal,
    Purple,
    Blue,
    Rose,
}

impl Accent {
    /// Every accent, in picker order
    pub const ALL: [Accent; 4] = [Accent::Teal, Accent::Purple, Accent::Blue, Accent::Rose];

    /// Stored/wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Teal => "teal",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Rose => "rose",
        }
    }
}

impl FromStr for Accent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teal" => Ok(Self::Teal),
            "purple" => Ok(Self::Purple),
            "blue" => Ok(Self::Blue),
            "rose" => Ok(Self::Rose),
            other => Err(format!("unknown accent: {other}")),
        }
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current visual preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub mode: ThemeMode,
    pub accent: Accent,
    pub sidebar_open: bool,
}

impl Preference {
    /// Class for the document root (`"dark"` or nothing)
    #[inline]
    #[must_use]
    pub fn root_class(&self) -> &'static str {
        match self.mode {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "",
        }
    }

    /// Style tokens for the current accent
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> AccentTokens {
        tokens_for(self.accent)
    }
}

/// Utility-class tokens derived from an accent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccentTokens {
    pub primary_gradient: &'static str,
    pub accent_text: &'static str,
    pub accent_hover_text: &'static str,
    pub button: &'static str,
    pub border: &'static str,
    pub ring: &'static str,
}

impl AccentTokens {
    /// All tokens, in declaration order
    #[must_use]
    pub fn as_array(&self) -> [&'static str; 6] {
        [
            self.primary_gradient,
            self.accent_text,
            self.accent_hover_text,
            self.button,
            self.border,
            self.ring,
        ]
    }
}

/// Style tokens for an accent
#[must_use]
pub fn tokens_for(accent: Accent) -> AccentTokens {
    match accent {
        Accent::Teal => AccentTokens {
            primary_gradient: "from-teal-500 to-teal-600",
            accent_text: "text-teal-500 dark:text-teal-400",
            accent_hover_text: "hover:text-teal-500 dark:hover:text-teal-400",
            button: "bg-teal-500 hover:bg-teal-600",
            border: "border-teal-500",
            ring: "ring-teal-500",
        },
        Accent::Purple => AccentTokens {
            primary_gradient: "from-purple-500 to-purple-600",
            accent_text: "text-purple-500 dark:text-purple-400",
            accent_hover_text: "hover:text-purple-500 dark:hover:text-purple-400",
            button: "bg-purple-500 hover:bg-purple-600",
            border: "border-purple-500",
            ring: "ring-purple-500",
        },
        Accent::Blue => AccentTokens {
            primary_gradient: "from-blue-500 to-blue-600",
            accent_text: "text-blue-500 dark:text-blue-400",
            accent_hover_text: "hover:text-blue-500 dark:hover:text-blue-400",
            button: "bg-blue-500 hover:bg-blue-600",
            border: "border-blue-500",
            ring: "ring-blue-500",
        },
        Accent::Rose => AccentTokens {
            primary_gradient: "from-rose-500 to-rose-600",
            accent_text: "text-rose-500 dark:text-rose-400",
            accent_hover_text: "hover:text-rose-500 dark:hover:text-rose-400",
            button: "bg-rose-500 hover:bg-rose-600",
            border: "border-rose-500",
            ring: "ring-rose-500",
        },
    }
}

/// Preference store
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Preference>,
    tx: watch::Sender<Preference>,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Initialize from storage
    ///
    /// Mode: stored value, else the system signal, else light.
    /// Accent: stored value, else teal. Unparseable stored values count as absent.
    pub fn load(storage: Arc<dyn KeyValueStore>, prefers_dark: bool) -> Self {
        let mode = read_lenient(storage.as_ref(), THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(if prefers_dark {
                ThemeMode::Dark
            } else {
                ThemeMode::Light
            });
        let accent = read_lenient(storage.as_ref(), COLOR_SCHEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        let preference = Preference {
            mode,
            accent,
            sidebar_open: false,
        };
        tracing::debug!(%mode, %accent, "preference loaded");

        let (tx, _rx) = watch::channel(preference);
        Self {
            storage,
            state: RwLock::new(preference),
            tx,
        }
    }

    /// Current preference
    #[inline]
    #[must_use]
    pub fn get(&self) -> Preference {
        *self.state.read()
    }

    /// Receive every subsequent change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Preference> {
        self.tx.subscribe()
    }

    /// Set light/dark mode
    pub fn set_mode(&self, mode: ThemeMode) {
        self.mutate(|p| p.mode = mode);
        self.persist(THEME_KEY, mode.as_str());
    }

    /// Flip light/dark mode
    pub fn toggle_mode(&self) -> ThemeMode {
        let mode = self.get().mode.toggled();
        self.set_mode(mode);
        mode
    }

    /// Set accent scheme
    pub fn set_accent(&self, accent: Accent) {
        self.mutate(|p| p.accent = accent);
        self.persist(COLOR_SCHEME_KEY, accent.as_str());
    }

    /// Flip the theme-control sidebar; never persisted
    pub fn toggle_sidebar(&self) -> bool {
        self.mutate(|p| p.sidebar_open = !p.sidebar_open).sidebar_open
    }

    fn mutate(&self, f: impl FnOnce(&mut Preference)) -> Preference {
        let updated = {
            let mut state = self.state.write();
            f(&mut state);
            *state
        };
        self.tx.send_replace(updated);
        updated
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "failed to persist preference");
        }
    }
}
