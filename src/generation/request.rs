// Request builder - assembles a model request from issue context and images
//
// Selects the vision-capable model when images are present and inlines each
// image as a base64 data URL. Never performs network I/O.

use super::error::GenerationError;
use super::pricing::{DEFAULT_MODEL, VISION_MODEL};
use super::prompts::system_prompt;
use crate::models::{GenerationMode, ImageDescriptor};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

/// Ephemeral input to one generation call. Not persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub issue_key: String,
    /// Free-text context: title + description + optional acceptance criteria
    pub text_context: String,
    pub images: Vec<ImageDescriptor>,
    pub mode: GenerationMode,
}

/// Model identifiers used when assembling a payload. The defaults match the
/// pricing table; configuration may substitute compatible models.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    /// Model for text-only requests
    pub default_model: String,
    /// Model when one or more images are inlined
    pub vision_model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            vision_model: VISION_MODEL.to_string(),
        }
    }
}

// ============================================================================
// Wire Types (OpenAI-style chat completions)
// ============================================================================

/// Request payload ready for the generation client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

/// Either a plain string (text-only turns) or a list of typed parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    /// Fixed hint; all inlined screenshots are sent at high detail
    pub detail: String,
}

/// Build the chat payload for a generation request.
///
/// An individual image that cannot be read is skipped with a warning -
/// a single bad image never aborts the whole request.
pub async fn build_request(
    request: &GenerationRequest,
    models: &ModelSelection,
) -> Result<ChatRequest, GenerationError> {
    if request.issue_key.trim().is_empty() {
        return Err(GenerationError::Validation(
            "issue key is required".to_string(),
        ));
    }
    if request.text_context.trim().is_empty() {
        return Err(GenerationError::Validation(
            "issue context is empty".to_string(),
        ));
    }

    let mut image_parts = Vec::new();
    for image in &request.images {
        match encode_image(image).await {
            Ok(part) => image_parts.push(part),
            Err(e) => {
                log::warn!(
                    "Skipping unreadable image '{}' for {}: {}",
                    image.original_name,
                    request.issue_key,
                    e
                );
            }
        }
    }

    let model = if image_parts.is_empty() {
        models.default_model.clone()
    } else {
        models.vision_model.clone()
    };

    let user_content = if image_parts.is_empty() {
        MessageContent::Text(request.text_context.clone())
    } else {
        let mut parts = vec![ContentPart::Text {
            text: request.text_context.clone(),
        }];
        parts.extend(image_parts);
        MessageContent::Parts(parts)
    };

    Ok(ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: MessageContent::Text(system_prompt(request.mode).to_string()),
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_content,
            },
        ],
    })
}

/// Inline one image as a base64 data URL part
async fn encode_image(image: &ImageDescriptor) -> std::io::Result<ContentPart> {
    let bytes = tokio::fs::read(&image.storage_path).await?;
    let url = format!(
        "data:{};base64,{}",
        image.mime_type.as_str(),
        BASE64.encode(&bytes)
    );
    Ok(ContentPart::ImageUrl {
        image_url: ImageUrl {
            url,
            detail: "high".to_string(),
        },
    })
}
