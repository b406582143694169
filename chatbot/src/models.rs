use serde::{Deserialize, Serialize};

/// A file handed over by the shell for a single request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type,
            data,
        }
    }

    /// Lowercased extension of the file name, if it has one.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Canonical input for the generation service.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPayload {
    Image { mime_type: String, data: Vec<u8> },
    Text(String),
}

/// One element of a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Payload(ContentPayload),
}

impl From<&str> for ContentPart {
    fn from(text: &str) -> Self {
        ContentPart::Text(text.to_string())
    }
}

impl From<ContentPayload> for ContentPart {
    fn from(payload: ContentPayload) -> Self {
        ContentPart::Payload(payload)
    }
}

/// Outcome of a summarization call. Failures stay visible to the user but
/// remain distinguishable from a real summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Summary {
    Generated(String),
    Failed(String),
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) | Summary::Failed(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_answer)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

// Gemini generateContent wire types

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

/// Inline binary data, base64 encoded.
#[derive(Debug, Serialize)]
pub struct GeminiInlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct GeminiGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiCandidateContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    pub block_reason: Option<String>,
}
