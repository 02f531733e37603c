//! Navigation capability.
//!
//! The router is an external collaborator. The session layer only asks for
//! the current path and requests redirects through [`Navigator`].

use std::sync::{Arc, Mutex};

/// Router abstraction used for failure- and policy-driven redirects.
pub trait Navigator: Send + Sync + 'static {
    /// Replace the current route with `path`.
    fn redirect_to(&self, path: &str);

    /// Path of the current route (no origin, no query string).
    fn current_path(&self) -> String;
}

/// A boxed, reference-counted [`Navigator`].
pub type ArcNavigator = Arc<dyn Navigator>;

/// In-memory navigator for headless use and tests.
///
/// Keeps the current path and the full list of redirects in order.
///
/// # Example
///
/// ```rust
/// use workmate_session::{MemoryNavigator, Navigator};
///
/// let nav = MemoryNavigator::new("/");
/// nav.redirect_to("/dashboard");
/// assert_eq!(nav.current_path(), "/dashboard");
/// assert_eq!(nav.redirects(), vec!["/dashboard".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

#[derive(Debug, Default)]
struct NavigatorState {
    current: String,
    redirects: Vec<String>,
}

impl MemoryNavigator {
    pub fn new(current_path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                current: current_path.into(),
                redirects: Vec::new(),
            }),
        }
    }

    /// All redirect targets requested so far, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.state.lock().map(|s| s.redirects.clone()).unwrap_or_default()
    }

    /// How many redirects went to `path`.
    pub fn redirect_count(&self, path: &str) -> usize {
        self.redirects().iter().filter(|p| p.as_str() == path).count()
    }

    /// Move to `path` without recording a redirect (simulates user navigation).
    pub fn visit(&self, path: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.current = path.into();
        }
    }
}

impl Navigator for MemoryNavigator {
    fn redirect_to(&self, path: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.current = path.to_string();
            state.redirects.push(path.to_string());
        }
    }

    fn current_path(&self) -> String {
        self.state.lock().map(|s| s.current.clone()).unwrap_or_default()
    }
}
