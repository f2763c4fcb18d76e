/// Controls validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// When true, dicts reject keys that are not declared in `content`.
    pub strict_mode: bool,
    /// Maximum bytes read from a document or structure file.
    pub max_document_size: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            max_document_size: 1024 * 1024,
        }
    }
}
