//! LLM client - Chat completion verso OpenRouter (API compatibile OpenAI)
//!
//! Supporta risposte complete e in streaming, e messaggi multimodali con
//! immagini e PDF passati come data URL base64.

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Parte di un messaggio multimodale
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
    File { file: FileData },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileData {
    pub filename: String,
    pub file_data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Messaggio utente con un allegato: le immagini vanno come `image_url`,
    /// i PDF come `file`
    pub fn user_with_attachment(
        text: impl Into<String>,
        file_name: &str,
        mime_type: &str,
        data_url: String,
    ) -> Self {
        let attachment = if mime_type == "application/pdf" {
            ContentPart::File {
                file: FileData {
                    filename: file_name.to_string(),
                    file_data: data_url,
                },
            }
        } else {
            ContentPart::ImageUrl {
                image_url: ImageUrl { url: data_url },
            }
        };
        Self {
            role: ChatRole::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                attachment,
            ]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Esito dell'interpretazione di una riga dello stream upstream
#[derive(Debug, PartialEq)]
enum StreamLine {
    Delta(String),
    Finished(Option<String>),
    Done,
    Ignored,
}

pub struct LlmClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn request(&self, request: &ChatRequest, stream: bool) -> reqwest::RequestBuilder {
        let body = CompletionBody {
            model: &request.model,
            messages: &request.messages,
            stream,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut req = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://taxguide.ca")
            .header("X-Title", "TaxGuide")
            .json(&body);

        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        req
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        error!(status, "LLM provider returned an error");
        Err(LlmError::Api { status, message })
    }

    #[instrument(skip(self, request), fields(model = %request.model, messages = request.messages.len()))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<Completion, LlmError> {
        debug!("Sending chat completion request");
        let resp = Self::check_status(self.request(request, false).send().await?).await?;

        let data: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("response has no content".to_string()))?;

        info!(chars = content.len(), "Chat completion received");
        Ok(Completion {
            content,
            model: data.model.unwrap_or_else(|| request.model.clone()),
            usage: data.usage,
        })
    }

    /// Richiesta in streaming: `on_delta` viene chiamata per ogni frammento di testo.
    /// Se `on_delta` restituisce `false` la lettura dello stream si interrompe
    /// (il client a valle si è disconnesso).
    #[instrument(skip(self, request, on_delta), fields(model = %request.model))]
    pub async fn chat_stream<F>(
        &self,
        request: &ChatRequest,
        mut on_delta: F,
    ) -> Result<Completion, LlmError>
    where
        F: FnMut(&str) -> bool + Send,
    {
        debug!("Sending streaming chat completion request");
        let resp = Self::check_status(self.request(request, true).send().await?).await?;

        let mut completion = Completion {
            content: String::new(),
            model: request.model.clone(),
            usage: None,
        };
        let mut stream = resp.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut stopped = false;

        'read: while let Some(chunk) = stream.next().await {
            lines.push(&chunk?);
            while let Some(line) = lines.next_line() {
                if !consume_line(&line, &mut completion, &mut on_delta) {
                    stopped = true;
                    break 'read;
                }
            }
        }

        // ultima riga senza '\n' finale
        if !stopped {
            if let Some(line) = lines.take_rest() {
                consume_line(&line, &mut completion, &mut on_delta);
            }
        }

        info!(chars = completion.content.len(), "Streaming completion finished");
        Ok(completion)
    }
}

/// Accumula i byte dello stream e restituisce solo righe complete:
/// un carattere UTF-8 diviso tra due chunk viene decodificato intero
#[derive(Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn take_rest(&mut self) -> Option<String> {
        if self.bytes.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.bytes);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Applica una riga dello stream; `false` quando la lettura deve fermarsi
fn consume_line<F>(line: &str, completion: &mut Completion, on_delta: &mut F) -> bool
where
    F: FnMut(&str) -> bool,
{
    match parse_stream_line(line.trim(), completion) {
        StreamLine::Delta(delta) => {
            completion.content.push_str(&delta);
            if !on_delta(&delta) {
                warn!("Downstream closed, aborting upstream stream");
                return false;
            }
            true
        }
        StreamLine::Finished(reason) => {
            debug!(?reason, "Upstream stream finished");
            false
        }
        StreamLine::Done => false,
        StreamLine::Ignored => true,
    }
}

fn parse_stream_line(line: &str, completion: &mut Completion) -> StreamLine {
    // righe vuote e commenti SSE (": OPENROUTER PROCESSING") vanno ignorati
    let Some(data) = line.strip_prefix("data:") else {
        return StreamLine::Ignored;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return StreamLine::Done;
    }

    let Ok(parsed) = serde_json::from_str::<StreamResponse>(data) else {
        warn!("Skipping unparseable stream line");
        return StreamLine::Ignored;
    };
    if let Some(model) = parsed.model {
        completion.model = model;
    }
    if parsed.usage.is_some() {
        completion.usage = parsed.usage;
    }

    let Some(choice) = parsed.choices.into_iter().next() else {
        return StreamLine::Ignored;
    };
    match choice.delta.and_then(|d| d.content) {
        Some(content) if !content.is_empty() => StreamLine::Delta(content),
        _ if choice.finish_reason.is_some() => StreamLine::Finished(choice.finish_reason),
        _ => StreamLine::Ignored,
    }
}
