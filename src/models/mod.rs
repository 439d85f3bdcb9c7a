// Core models - canonical type definitions for the generation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Image Types
// ============================================================================

/// Supported MIME types for uploaded images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageMimeType {
    #[serde(rename = "image/png")]
    ImagePng,
    #[serde(rename = "image/jpeg")]
    ImageJpeg,
    #[serde(rename = "image/gif")]
    ImageGif,
    #[serde(rename = "image/webp")]
    ImageWebp,
}

impl ImageMimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMimeType::ImagePng => "image/png",
            ImageMimeType::ImageJpeg => "image/jpeg",
            ImageMimeType::ImageGif => "image/gif",
            ImageMimeType::ImageWebp => "image/webp",
        }
    }

    /// Get file extension for this MIME type
    pub fn extension(&self) -> &'static str {
        match self {
            ImageMimeType::ImagePng => "png",
            ImageMimeType::ImageJpeg => "jpg",
            ImageMimeType::ImageGif => "gif",
            ImageMimeType::ImageWebp => "webp",
        }
    }
}

impl std::fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImageMimeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image/png" => Ok(ImageMimeType::ImagePng),
            "image/jpeg" | "image/jpg" => Ok(ImageMimeType::ImageJpeg),
            "image/gif" => Ok(ImageMimeType::ImageGif),
            "image/webp" => Ok(ImageMimeType::ImageWebp),
            _ => Err(format!(
                "Invalid image MIME type: '{}'. Expected 'image/png', 'image/jpeg', 'image/gif', or 'image/webp'",
                s
            )),
        }
    }
}

/// A processed uploaded image awaiting consumption by a generation call.
///
/// Immutable after creation. The backing file at `storage_path` is owned by
/// whichever image session holds this descriptor until cleanup deletes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    /// Filename as uploaded by the user
    pub original_name: String,
    /// Filename on disk (unique, sanitized)
    pub stored_name: String,
    /// Absolute path to the backing file
    pub storage_path: PathBuf,
    /// MIME type of the processed image
    pub mime_type: ImageMimeType,
    /// Size in bytes after processing
    pub byte_size: u64,
    /// Size in bytes as uploaded
    pub original_byte_size: u64,
    /// Image width in pixels (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Image height in pixels (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// When the image was uploaded
    pub uploaded_at: DateTime<Utc>,
}

/// Validation constants for uploaded images
pub mod image_limits {
    /// Maximum file size per image (10 MB)
    pub const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;
    /// Maximum number of images per session
    pub const MAX_IMAGES_PER_SESSION: usize = 5;
}

// ============================================================================
// Generation Types
// ============================================================================

/// Which instruction template governs output style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Broad QA coverage for manual testing
    Manual,
    /// Automation-oriented coverage
    Auto,
}

impl Default for GenerationMode {
    fn default() -> Self {
        GenerationMode::Manual
    }
}

/// Token usage reported by the provider for one generation call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Output of one successful generation call. Immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Raw markdown returned by the model
    pub content: String,
    /// Provider-reported token usage
    pub token_usage: TokenUsage,
    /// Deterministic cost in USD, computed from the per-model rate table
    pub cost: f64,
}

/// Lifecycle status of a generation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Completed,
    Failed,
}

/// One prior content snapshot in a generation's version ledger.
///
/// Version numbers are monotonically increasing per generation and never
/// reused; the ledger never contains two entries with the same number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    pub version_number: u32,
    /// The content as it was before the edit that created this entry
    pub content: String,
    pub updated_at: DateTime<Utc>,
    /// Principal that performed the edit
    pub updated_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The subset of the persisted generation record owned by the core.
///
/// The persistence layer owns the full record for its lifetime; the core
/// reads and writes only these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: String,
    /// Issue the generation was produced for (e.g. "PROJ-123")
    pub issue_key: String,
    pub mode: GenerationMode,
    /// Live markdown content, present once a generation has succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    pub status: GenerationStatus,
    /// Human-readable error string for failed generations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Append-only history of prior content snapshots
    pub versions: Vec<ContentVersion>,
    /// Version of the live content; always one past the last ledger entry
    pub current_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Create a fresh pending record for an issue
    pub fn new(id: String, issue_key: String, mode: GenerationMode) -> Self {
        let now = Utc::now();
        Self {
            id,
            issue_key,
            mode,
            result: None,
            token_usage: None,
            cost: None,
            status: GenerationStatus::Pending,
            error: None,
            versions: Vec::new(),
            current_version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Structured test-case row derived from generated markdown on export.
///
/// All fields are cleaned plain text (markdown markup stripped). Recomputed
/// on every export, never persisted independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub id: u32,
    pub title: String,
    pub priority: String,
    pub preconditions: String,
    pub steps: String,
    pub expected_result: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mime_type_round_trip() {
        for (input, expected) in [
            ("image/png", ImageMimeType::ImagePng),
            ("image/jpeg", ImageMimeType::ImageJpeg),
            ("image/jpg", ImageMimeType::ImageJpeg),
            ("IMAGE/GIF", ImageMimeType::ImageGif),
            ("image/webp", ImageMimeType::ImageWebp),
        ] {
            assert_eq!(ImageMimeType::from_str(input).unwrap(), expected);
        }
    }

    #[test]
    fn test_mime_type_invalid() {
        assert!(ImageMimeType::from_str("application/pdf").is_err());
        assert!(ImageMimeType::from_str("").is_err());
    }

    #[test]
    fn test_mime_type_extension() {
        assert_eq!(ImageMimeType::ImageJpeg.extension(), "jpg");
        assert_eq!(ImageMimeType::ImagePng.extension(), "png");
    }

    #[test]
    fn test_new_record_starts_pending_at_version_one() {
        let record = GenerationRecord::new(
            "gen-1".to_string(),
            "PROJ-42".to_string(),
            GenerationMode::Manual,
        );
        assert_eq!(record.status, GenerationStatus::Pending);
        assert_eq!(record.current_version, 1);
        assert!(record.versions.is_empty());
        assert!(record.result.is_none());
    }

    #[test]
    fn test_generation_mode_serde() {
        assert_eq!(
            serde_json::to_string(&GenerationMode::Manual).unwrap(),
            "\"manual\""
        );
        assert_eq!(
            serde_json::from_str::<GenerationMode>("\"auto\"").unwrap(),
            GenerationMode::Auto
        );
    }
}
