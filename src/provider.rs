//! Default Content Providers
//!
//! Supplies the bytes used to materialize a config file that does not exist
//! yet, decoupling the store from wherever templates actually live (packaged
//! resources, embedded assets, a directory of samples).

use std::collections::HashMap;

/// Source of first-run file content
pub trait DefaultContentProvider: Send + Sync {
    /// Template bytes for the given file name, or `None` when no template
    /// exists and an empty file should be created instead
    fn default_content(&self, file_name: &str) -> Option<Vec<u8>>;
}

/// Provider with no templates; missing files materialize empty
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContentProvider;

impl DefaultContentProvider for EmptyContentProvider {
    fn default_content(&self, _file_name: &str) -> Option<Vec<u8>> {
        None
    }
}

/// Provider backed by an in-memory map of file name to template bytes
#[derive(Debug, Default, Clone)]
pub struct StaticContentProvider {
    templates: HashMap<String, Vec<u8>>,
}

impl StaticContentProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template for a file name
    pub fn with_template(mut self, file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.templates.insert(file_name.into(), content.into());
        self
    }
}

impl DefaultContentProvider for StaticContentProvider {
    fn default_content(&self, file_name: &str) -> Option<Vec<u8>> {
        self.templates.get(file_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_provider_has_no_content() {
        assert_eq!(EmptyContentProvider.default_content("config.yml"), None);
    }

    #[test]
    fn test_static_provider_serves_registered_template() {
        let provider = StaticContentProvider::new().with_template("app.conf", "retries=3\n");

        assert_eq!(
            provider.default_content("app.conf"),
            Some(b"retries=3\n".to_vec())
        );
        assert_eq!(provider.default_content("other.conf"), None);
    }
}
