//! Generative text collaborators
//!
//! Every backend implements [`TextGenerator`]. Callers never branch on why a
//! completion failed: any error means "unavailable" and triggers their
//! deterministic fallback.

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AiConfig, AiProvider};
use crate::error::{ProdlensError, Result};

/// Per-request completion options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    /// Ask for a JSON object; the reply must parse as JSON
    pub json_mode: bool,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            json_mode: false,
        }
    }
}

/// An opaque text-completion capability
pub trait TextGenerator {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String>;

    /// Capability probe; consulted once per session by the caller
    fn is_available(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Build the configured backend
pub fn generator_from_config(config: &AiConfig) -> Box<dyn TextGenerator> {
    if !config.enabled {
        return Box::new(DisabledGenerator);
    }
    match config.provider {
        AiProvider::Openai => Box::new(OpenAiGenerator::from_config(config)),
        AiProvider::ClaudeCli => {
            Box::new(ClaudeCliGenerator::new(Duration::from_secs(config.timeout_secs)))
        }
    }
}

/// Never available; used for offline runs
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String> {
        Err(ProdlensError::AiUnavailable)
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

// ============================================================================
// OpenAI-compatible chat completions
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions over HTTP (OpenAI or any compatible proxy)
pub struct OpenAiGenerator {
    agent: ureq::Agent,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiGenerator {
    pub fn from_config(config: &AiConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }
}

impl TextGenerator for OpenAiGenerator {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(ProdlensError::AiUnavailable)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            max_tokens: options.max_tokens,
            response_format: options.json_mode.then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(model = %self.model, json_mode = options.json_mode, "sending chat completion");

        let response: ChatResponse = self
            .agent
            .post(&format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", api_key))
            .send_json(&request)?
            .into_body()
            .read_json()?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProdlensError::Generative("Empty completion".into()))
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Claude CLI
// ============================================================================

/// Shells out to a locally installed `claude` CLI
pub struct ClaudeCliGenerator {
    workspace: std::path::PathBuf,
    timeout: Duration,
}

impl ClaudeCliGenerator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            workspace: std::env::temp_dir().join("prodlens-workspace"),
            timeout,
        }
    }
}

impl TextGenerator for ClaudeCliGenerator {
    fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String> {
        std::fs::create_dir_all(&self.workspace)?;

        // The CLI has no token cap, so the budget goes into the prompt
        let word_budget = options.max_tokens * 3 / 4;
        let system_prompt = if options.json_mode {
            format!(
                "{system_prompt}\nRespond only with valid JSON. \
                 Do not include any text before or after the JSON."
            )
        } else {
            format!("{system_prompt}\nKeep the response under {word_budget} words.")
        };

        let mut command = Command::new("claude");
        command.current_dir(&self.workspace).args([
            "-p",
            "--output-format", "json",
            "--max-turns", "1",
            "--system-prompt", &system_prompt,
            user_prompt,
        ]);
        let output = output_with_timeout(&mut command, self.timeout)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProdlensError::Generative(stderr.trim().to_string()));
        }

        // Claude's JSON output wraps the actual response in a `result` field
        let stdout = String::from_utf8_lossy(&output.stdout);
        let envelope: serde_json::Value = serde_json::from_str(&stdout)?;
        let result_text = envelope["result"]
            .as_str()
            .ok_or_else(|| ProdlensError::Generative("No result in response".into()))?;

        Ok(result_text.trim().to_string())
    }

    fn is_available(&self) -> bool {
        claude_version().is_some()
    }

    fn name(&self) -> &'static str {
        "claude-cli"
    }
}

/// Run a command to completion, killing it once `timeout` has elapsed.
///
/// Output pipes are drained on their own threads so a chatty child cannot
/// block on a full pipe while we poll.
pub fn output_with_timeout(command: &mut Command, timeout: Duration) -> Result<Output> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            debug!(timeout_secs = timeout.as_secs_f64(), "child process timed out");
            return Err(ProdlensError::Generative("timeout".into()));
        }
        thread::sleep(Duration::from_millis(25));
    };

    let collect = |handle: Option<thread::JoinHandle<Vec<u8>>>| {
        handle.and_then(|h| h.join().ok()).unwrap_or_default()
    };
    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// Installed Claude CLI version, if any
pub fn claude_version() -> Option<String> {
    Command::new("claude")
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// Strip markdown code fencing from a string (e.g., ```json ... ```)
/// Also handles cases where there's text before the code block
pub fn strip_code_fencing(s: &str) -> String {
    let trimmed = s.trim();

    // "Here's the list:\n```json\n{...}\n```"
    if let Some(json_start) = trimmed.find("```json") {
        let after_fence = &trimmed[json_start + 7..];
        if let Some(end_fence) = after_fence.find("```") {
            return after_fence[..end_fence].trim().to_string();
        }
        return after_fence.trim().to_string();
    }

    if let Some(code_start) = trimmed.find("```\n") {
        let after_fence = &trimmed[code_start + 4..];
        if let Some(end_fence) = after_fence.find("```") {
            return after_fence[..end_fence].trim().to_string();
        }
        return after_fence.trim().to_string();
    }

    let without_prefix = trimmed.strip_prefix("```").unwrap_or(trimmed).trim();
    without_prefix
        .strip_suffix("```")
        .unwrap_or(without_prefix)
        .trim()
        .to_string()
}
