//! Ordered plugin registry for document augmentation hooks.
//!
//! Plugins are functions invoked once per HTML-parsed response, each
//! receiving the same queryable [`Window`], strictly in registration order.
//! They mutate window state in place (typically through its data map); the
//! registry observes no return value.
//!
//! The registry is shared across all verb calls made through one harness
//! and is append-only: registration happens through the caller's direct,
//! synchronous calls, never from the parsing path, which only reads.
//!
//! # Examples
//!
//! ```ignore
//! harness
//!     .plugin(|window| {
//!         let links = window.select("a[href]").len();
//!         window.set_data("links", links.into());
//!     })
//!     .plugin(|window| {
//!         window.set_data("audited", true.into());
//!     });
//! ```

use crate::dom::Window;
use std::sync::Arc;

/// A registered augmentation hook.
pub type PluginFn = Arc<dyn Fn(&Window) + Send + Sync + 'static>;

/// An ordered, append-only sequence of augmentation hooks.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginFn>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Append a plugin; chainable.
    pub fn register<F>(&mut self, plugin: F) -> &mut Self
    where
        F: Fn(&Window) + Send + Sync + 'static,
    {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Append an already-shared plugin; chainable.
    pub fn register_shared(&mut self, plugin: PluginFn) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Invoke every plugin, in registration order, against `window`.
    ///
    /// A no-op unless the window is queryable (augmentation completed); the
    /// harness additionally only calls this for Document-variant bodies.
    pub fn apply_all(&self, window: &Window) {
        if !window.is_queryable() {
            tracing::debug!("skipping plugins: window has no query surface");
            return;
        }

        for plugin in &self.plugins {
            plugin(window);
        }
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DocumentSummary, Window};
    use serde_json::json;

    fn queryable_window() -> Window {
        let window = Window::new("<html></html>".to_string(), Vec::new(), Vec::new(), None);
        window.install_summary(DocumentSummary::default());
        window
    }

    #[test]
    fn test_plugins_run_in_registration_order() {
        let mut registry = PluginRegistry::new();
        registry
            .register(|window| {
                window.set_data("order", json!(["first"]));
            })
            .register(|window| {
                let mut order = window.data("order").unwrap();
                order.as_array_mut().unwrap().push(json!("second"));
                window.set_data("order", order);
            });

        let window = queryable_window();
        registry.apply_all(&window);

        assert_eq!(window.data("order"), Some(json!(["first", "second"])));
    }

    #[test]
    fn test_not_queryable_window_is_a_no_op() {
        let mut registry = PluginRegistry::new();
        registry.register(|window| {
            window.set_data("ran", json!(true));
        });

        let window = Window::new(String::new(), Vec::new(), Vec::new(), None);
        registry.apply_all(&window);

        assert_eq!(window.data("ran"), None);
    }

    #[test]
    fn test_len_tracks_registrations() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());
        registry.register(|_| {}).register(|_| {});
        assert_eq!(registry.len(), 2);
    }
}
