use thiserror::Error;

/// Why a single file was not rewritten.
///
/// [`TypeMismatch`](RewriteError::TypeMismatch) is a deliberate skip; every
/// other variant is a failure. Neither stops the run.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("not a JPEG file (detected: {detected})")]
    TypeMismatch { detected: String },

    #[error("could not read file: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("directory name {dir:?} is not a YYYY-MM-DD date{}", parse_detail(.source))]
    DateParse {
        dir: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("could not update EXIF metadata: {0:#}")]
    Metadata(anyhow::Error),
}

fn parse_detail(source: &Option<chrono::ParseError>) -> String {
    source.as_ref().map(|e| format!(" ({e})")).unwrap_or_default()
}

impl RewriteError {
    /// `true` when the file was passed over on purpose rather than failing.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
