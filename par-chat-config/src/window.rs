//! Persisted window geometry.

use crate::error::Result;
use crate::store::{SettingsStore, SettingsStoreExt};

const DEFAULT_WIDTH: i32 = 800;
const DEFAULT_HEIGHT: i32 = 600;

/// Position and size of a top-level window, stored as four integer settings
/// under `/windows/<name>/geometry/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl WindowGeometry {
    fn key(window_name: &str, field: &str) -> String {
        format!("/windows/{window_name}/geometry/{field}")
    }

    /// Load the geometry for `window_name`. Missing fields keep their default.
    pub fn load(store: &dyn SettingsStore, window_name: &str) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            x: store
                .load(&Self::key(window_name, "x"))?
                .unwrap_or(defaults.x),
            y: store
                .load(&Self::key(window_name, "y"))?
                .unwrap_or(defaults.y),
            width: store
                .load(&Self::key(window_name, "width"))?
                .unwrap_or(defaults.width),
            height: store
                .load(&Self::key(window_name, "height"))?
                .unwrap_or(defaults.height),
        })
    }

    pub fn save(&self, store: &dyn SettingsStore, window_name: &str) -> Result<()> {
        store.save(&Self::key(window_name, "x"), &self.x)?;
        store.save(&Self::key(window_name, "y"), &self.y)?;
        store.save(&Self::key(window_name, "width"), &self.width)?;
        store.save(&Self::key(window_name, "height"), &self.height)?;
        Ok(())
    }

    /// Width and height are at least one pixel.
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySettingsStore;

    #[test]
    fn test_defaults_when_unset() {
        let store = MemorySettingsStore::new();
        let geometry = WindowGeometry::load(&store, "main").expect("load failed");
        assert_eq!(geometry, WindowGeometry::default());
        assert!(geometry.is_usable());
    }

    #[test]
    fn test_windows_are_stored_independently() {
        let store = MemorySettingsStore::new();
        let main = WindowGeometry {
            x: 10,
            y: 20,
            width: 1024,
            height: 768,
        };
        main.save(&store, "main").expect("save failed");

        assert_eq!(
            WindowGeometry::load(&store, "main").expect("load failed"),
            main
        );
        assert_eq!(
            WindowGeometry::load(&store, "popup").expect("load failed"),
            WindowGeometry::default()
        );
        let x: Option<i32> = store.load("/windows/main/geometry/x").expect("load failed");
        assert_eq!(x, Some(10));
    }
}
