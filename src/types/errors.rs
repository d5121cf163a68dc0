use std::fmt;

// === StoreError ===

/// Errors raised by the persistent store.
#[derive(Debug)]
pub enum StoreError {
    /// The database file could not be opened.
    OpenFailed(String),
    /// A schema migration failed.
    MigrationFailed(String),
    /// The database was written by a newer schema than this build supports.
    VersionMismatch { found: i32, supported: i32 },
    /// A record could not be encoded or decoded.
    Codec(String),
    /// A query against an open database failed.
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::OpenFailed(msg) => write!(f, "Failed to open store: {}", msg),
            StoreError::MigrationFailed(msg) => write!(f, "Store migration failed: {}", msg),
            StoreError::VersionMismatch { found, supported } => write!(
                f,
                "Store schema version {} is newer than supported version {}",
                found, supported
            ),
            StoreError::Codec(msg) => write!(f, "Store codec error: {}", msg),
            StoreError::Query(msg) => write!(f, "Store query error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

// === BoostError ===

/// Errors related to boost management.
#[derive(Debug)]
pub enum BoostError {
    /// Boost with the given ID was not found.
    NotFound(String),
    /// The boost pattern is empty or unusable.
    InvalidPattern(String),
    /// Boost data could not be (de)serialized.
    SerializationError(String),
    /// The store rejected the operation.
    StorageError(String),
}

impl fmt::Display for BoostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoostError::NotFound(id) => write!(f, "Boost not found: {}", id),
            BoostError::InvalidPattern(pattern) => write!(f, "Invalid boost pattern: '{}'", pattern),
            BoostError::SerializationError(msg) => {
                write!(f, "Boost serialization error: {}", msg)
            }
            BoostError::StorageError(msg) => write!(f, "Boost storage error: {}", msg),
        }
    }
}

impl std::error::Error for BoostError {}

impl From<StoreError> for BoostError {
    fn from(e: StoreError) -> Self {
        BoostError::StorageError(e.to_string())
    }
}

// === CollectionError ===

/// Errors related to collections and their items.
#[derive(Debug)]
pub enum CollectionError {
    /// Collection with the given ID was not found.
    NotFound(String),
    /// Item with the given ID was not found in the collection.
    ItemNotFound(String),
    /// Collection name is empty.
    InvalidName,
    /// Export or import failed.
    SerializationError(String),
    /// Secure random generation failed while creating a share link.
    ShareFailed(String),
    /// The store rejected the operation.
    StorageError(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::NotFound(id) => write!(f, "Collection not found: {}", id),
            CollectionError::ItemNotFound(id) => write!(f, "Collection item not found: {}", id),
            CollectionError::InvalidName => write!(f, "Collection name cannot be empty"),
            CollectionError::SerializationError(msg) => {
                write!(f, "Collection serialization error: {}", msg)
            }
            CollectionError::ShareFailed(msg) => write!(f, "Collection share failed: {}", msg),
            CollectionError::StorageError(msg) => write!(f, "Collection storage error: {}", msg),
        }
    }
}

impl std::error::Error for CollectionError {}

impl From<StoreError> for CollectionError {
    fn from(e: StoreError) -> Self {
        CollectionError::StorageError(e.to_string())
    }
}

// === NoteError ===

/// Errors related to browser notes.
#[derive(Debug)]
pub enum NoteError {
    /// Note with the given ID was not found.
    NotFound(String),
    /// The store rejected the operation.
    StorageError(String),
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::NotFound(id) => write!(f, "Note not found: {}", id),
            NoteError::StorageError(msg) => write!(f, "Note storage error: {}", msg),
        }
    }
}

impl std::error::Error for NoteError {}

impl From<StoreError> for NoteError {
    fn from(e: StoreError) -> Self {
        NoteError::StorageError(e.to_string())
    }
}

// === ReadingListError ===

/// Errors related to the reading list.
#[derive(Debug)]
pub enum ReadingListError {
    /// Reading list item with the given ID was not found.
    NotFound(String),
    /// The URL is not an http(s) address.
    InvalidUrl(String),
    /// The store rejected the operation.
    StorageError(String),
}

impl fmt::Display for ReadingListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingListError::NotFound(id) => write!(f, "Reading list item not found: {}", id),
            ReadingListError::InvalidUrl(url) => write!(f, "Invalid reading list URL: {}", url),
            ReadingListError::StorageError(msg) => {
                write!(f, "Reading list storage error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ReadingListError {}

impl From<StoreError> for ReadingListError {
    fn from(e: StoreError) -> Self {
        ReadingListError::StorageError(e.to_string())
    }
}

// === PreviewError ===

/// Errors raised while fetching a page for a link preview.
///
/// These never reach `get_preview` callers; they select the fallback preview.
#[derive(Debug)]
pub enum PreviewError {
    /// The URL could not be parsed or is not http(s).
    InvalidUrl(String),
    /// The request failed or timed out.
    NetworkError(String),
    /// The server answered with a non-success status.
    HttpStatus(u16),
    /// The response was not HTML.
    NotHtml(String),
    /// The response body exceeded the configured limit.
    TooLarge(usize),
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::InvalidUrl(url) => write!(f, "Invalid preview URL: {}", url),
            PreviewError::NetworkError(msg) => write!(f, "Preview network error: {}", msg),
            PreviewError::HttpStatus(code) => write!(f, "Preview HTTP status: {}", code),
            PreviewError::NotHtml(content_type) => {
                write!(f, "Preview target is not HTML: {}", content_type)
            }
            PreviewError::TooLarge(size) => write!(f, "Preview response too large: {} bytes", size),
        }
    }
}

impl std::error::Error for PreviewError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => write!(f, "Invalid settings value: {}", msg),
        }
    }
}

impl std::error::Error for SettingsError {}
