//! Client-side navigation targets and the dashboard guard

use std::fmt;
use std::str::FromStr;

/// Navigable page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    Certificates,
    ChangePassword,
}

impl Route {
    /// Every route
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::Login,
        Route::Dashboard,
        Route::Certificates,
        Route::ChangePassword,
    ];

    #[inline]
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::Certificates => "/certificates",
            Self::ChangePassword => "/change-password",
        }
    }

    /// Match a path, ignoring a trailing slash
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL.into_iter().find(|r| r.path() == normalized)
    }

    /// Where navigation to `self` actually lands
    ///
    /// The dashboard needs a session and sends anonymous visitors to the
    /// login page; the login page sends signed-in users on to the dashboard.
    #[must_use]
    pub fn resolve(self, authenticated: bool) -> Self {
        match (self, authenticated) {
            (Self::Dashboard, false) => Self::Login,
            (Self::Login, true) => Self::Dashboard,
            (route, _) => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_path(s).ok_or_else(|| format!("unknown route: {s}"))
    }
}
