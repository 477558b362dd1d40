//! Parsing options and configuration.

/// Options for parsing DOCX containers.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Whether to extract media assets from `word/media/`.
    pub extract_media: bool,

    /// Whether to encode media assets in parallel.
    pub parallel: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable media extraction.
    pub fn with_media(mut self, extract: bool) -> Self {
        self.extract_media = extract;
        self
    }

    /// Enable or disable parallel media encoding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel media encoding.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            extract_media: true,
            parallel: true,
        }
    }
}
