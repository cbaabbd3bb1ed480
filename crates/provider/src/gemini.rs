//! Gemini backend.
//!
//! Speaks the `generateContent` protocol against either Vertex AI or the
//! public Generative Language API.

use crate::*;
use reqwest::Client;
use serde_json::json;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// How requests to Gemini are authenticated
#[derive(Debug, Clone)]
pub enum GeminiAuth {
    /// Vertex AI endpoint with an OAuth bearer token
    Vertex {
        project: String,
        location: String,
        token: String,
    },
    /// Generative Language API with an API key
    ApiKey(String),
}

/// Gemini chat backend
pub struct GeminiProvider {
    client: Client,
    auth: GeminiAuth,
    base_url: Option<String>,
    default_model: String,
}

impl GeminiProvider {
    pub fn new(auth: GeminiAuth, default_model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: None,
            default_model: default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Build a provider from the environment.
    ///
    /// Credential resolution exports `GOOGLE_GENAI_USE_VERTEXAI=true` along
    /// with the project and location, in which case requests go to Vertex AI
    /// with the token from `GOOGLE_OAUTH_ACCESS_TOKEN`. Otherwise the key in
    /// `GOOGLE_API_KEY` (or `GEMINI_API_KEY`) selects the public API.
    ///
    /// A missing token or key is not an error here; `chat` reports
    /// [`ProviderError::NoApiKey`] when the provider is actually used.
    pub fn from_env() -> Self {
        let use_vertex = std::env::var("GOOGLE_GENAI_USE_VERTEXAI")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let auth = if use_vertex {
            GeminiAuth::Vertex {
                project: std::env::var("GOOGLE_CLOUD_PROJECT").unwrap_or_default(),
                location: std::env::var("GOOGLE_CLOUD_LOCATION")
                    .unwrap_or_else(|_| "us-central1".to_string()),
                token: std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").unwrap_or_default(),
            }
        } else {
            let key = std::env::var("GOOGLE_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .unwrap_or_default();
            GeminiAuth::ApiKey(key)
        };

        Self::new(auth, None)
    }

    /// Redirect requests to a different host. Tests point this at a local
    /// mock server.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    fn request_url(&self, model: &str) -> String {
        match &self.auth {
            GeminiAuth::Vertex {
                project, location, ..
            } => {
                let base = match &self.base_url {
                    Some(base) => base.clone(),
                    None => format!("https://{}-aiplatform.googleapis.com", location),
                };
                format!(
                    "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                    base, project, location, model
                )
            }
            GeminiAuth::ApiKey(_) => {
                let base = self
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());
                format!("{}/v1beta/models/{}:generateContent", base, model)
            }
        }
    }

    fn build_request(&self, params: &ChatParams) -> serde_json::Value {
        let mut contents: Vec<serde_json::Value> = Vec::new();
        let mut system_parts: Vec<String> = Vec::new();
        let mut last_was_tool = false;

        for m in &params.messages {
            match m.role.as_str() {
                "system" => {
                    if let Some(content) = &m.content {
                        system_parts.push(content.clone());
                    }
                    last_was_tool = false;
                }
                "assistant" => {
                    let mut parts = Vec::new();
                    if let Some(content) = &m.content {
                        if !content.is_empty() {
                            parts.push(json!({ "text": content }));
                        }
                    }
                    if let Some(tool_calls) = &m.tool_calls {
                        for call in tool_calls {
                            parts.push(json!({
                                "functionCall": {
                                    "name": &call.function.name,
                                    "args": &call.function.arguments,
                                }
                            }));
                        }
                    }
                    if !parts.is_empty() {
                        contents.push(json!({ "role": "model", "parts": parts }));
                    }
                    last_was_tool = false;
                }
                "tool" => {
                    // Function responses ride in a user turn. Results for
                    // parallel calls must share one turn, so consecutive
                    // tool messages collapse into the same entry.
                    let part = json!({
                        "functionResponse": {
                            "name": m.name.clone().unwrap_or_default(),
                            "response": { "result": m.content.clone().unwrap_or_default() },
                        }
                    });
                    match contents.last_mut().filter(|_| last_was_tool) {
                        Some(entry) => {
                            if let Some(parts) = entry["parts"].as_array_mut() {
                                parts.push(part);
                            }
                        }
                        None => contents.push(json!({ "role": "user", "parts": [part] })),
                    }
                    last_was_tool = true;
                }
                _ => {
                    if let Some(content) = &m.content {
                        contents.push(json!({ "role": "user", "parts": [{ "text": content }] }));
                    }
                    last_was_tool = false;
                }
            }
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": params.max_tokens,
                "temperature": params.temperature,
            },
        });

        if !system_parts.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": system_parts.join("\n\n") }]
            });
        }

        if !params.tools.is_empty() {
            let declarations: Vec<serde_json::Value> = params
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": &t.function.name,
                        "description": &t.function.description,
                        "parameters": &t.function.parameters,
                    })
                })
                .collect();

            body["tools"] = json!([{ "functionDeclarations": declarations }]);
            body["toolConfig"] = match &params.tool_choice {
                ToolChoice::Auto => json!({ "functionCallingConfig": { "mode": "AUTO" } }),
                ToolChoice::Required(name) => json!({
                    "functionCallingConfig": {
                        "mode": "ANY",
                        "allowedFunctionNames": [name],
                    }
                }),
                ToolChoice::None => json!({ "functionCallingConfig": { "mode": "NONE" } }),
            };
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<ChatResponse> {
        let candidate = json["candidates"]
            .get(0)
            .ok_or_else(|| ProviderError::InvalidResponse("no candidates".to_string()))?;

        let finish_reason = candidate["finishReason"]
            .as_str()
            .unwrap_or("stop")
            .to_lowercase();

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        if let Some(parts) = candidate["content"]["parts"].as_array() {
            for part in parts {
                if let Some(t) = part["text"].as_str() {
                    text.push_str(t);
                }
                if let Some(call) = part.get("functionCall") {
                    // Gemini does not assign call ids; synthesize stable ones
                    // so tool results can be matched back.
                    let id = format!("call_{}", tool_calls.len() + 1);
                    let args = match call.get("args") {
                        Some(args) if !args.is_null() => args.clone(),
                        _ => json!({}),
                    };
                    tool_calls.push(ToolCall {
                        id,
                        name: call["name"].as_str().unwrap_or("").to_string(),
                        arguments: args,
                    });
                }
            }
        }

        let content = if text.is_empty() { None } else { Some(text) };

        let usage = if let Some(meta) = json["usageMetadata"].as_object() {
            Usage {
                prompt_tokens: meta
                    .get("promptTokenCount")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                completion_tokens: meta
                    .get("candidatesTokenCount")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
                total_tokens: meta
                    .get("totalTokenCount")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0) as u32,
            }
        } else {
            Usage::default()
        };

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for GeminiProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        let model = if params.model.is_empty() {
            self.default_model.clone()
        } else {
            params.model.clone()
        };

        let url = self.request_url(&model);
        trace!("contacting Gemini at {}", url);

        let body = self.build_request(&params);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);

        match &self.auth {
            GeminiAuth::Vertex { token, .. } => {
                if token.is_empty() {
                    return Err(ProviderError::NoApiKey);
                }
                request = request.header("Authorization", format!("Bearer {}", token));
            }
            GeminiAuth::ApiKey(key) => {
                if key.is_empty() {
                    return Err(ProviderError::NoApiKey);
                }
                request = request.query(&[("key", key.as_str())]);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let json: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let error = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }
            return Err(ProviderError::Api(error));
        }

        debug!(
            "gemini replied with {} function call(s)",
            json["candidates"][0]["content"]["parts"]
                .as_array()
                .map(|parts| {
                    parts
                        .iter()
                        .filter(|p| p.get("functionCall").is_some())
                        .count()
                })
                .unwrap_or(0)
        );

        self.parse_response(json)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        match &self.auth {
            GeminiAuth::Vertex { token, .. } => !token.is_empty(),
            GeminiAuth::ApiKey(key) => !key.is_empty(),
        }
    }
}
