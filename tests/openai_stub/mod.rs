use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum DraftBehavior {
    /// A valid post wrapped in a ```markdown fence.
    FencedPost,
    /// A post whose front matter has no title.
    MissingTitle,
    /// HTTP 500 with an OpenAI-style error body.
    ServerError,
}

/// Minimal Responses API stand-in. Draft prompts get a fixed Portuguese post;
/// prompts carrying `BEGIN_POST ... END_POST` get an English rendition of the
/// embedded post.
pub struct OpenAiStub {
    pub base_url: String,
    prompts: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl OpenAiStub {
    pub fn spawn(behavior: DraftBehavior) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start openai stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&prompts);

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                if request.method() != &tiny_http::Method::Post || path != "/v1/responses" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }

                let parsed: Value = match serde_json::from_str(&body) {
                    Ok(value) => value,
                    Err(_) => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("invalid json").with_status_code(400),
                        );
                        continue;
                    }
                };

                let Some(prompt) = parsed.get("input").and_then(|v| v.as_str()) else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("missing input").with_status_code(400),
                    );
                    continue;
                };
                seen.lock().expect("lock prompts").push(prompt.to_owned());

                let output_text = if let Some(post) = extract_between(prompt, "BEGIN_POST\n", "\nEND_POST") {
                    translate_response(post)
                } else {
                    match behavior {
                        DraftBehavior::FencedPost => draft_response(),
                        DraftBehavior::MissingTitle => {
                            "---\ndate: \"2020-01-01\"\n---\n\nSem título.\n".to_owned()
                        }
                        DraftBehavior::ServerError => {
                            let error = serde_json::json!({
                                "error": { "message": "stub overloaded", "type": "server_error" }
                            });
                            let _ = request.respond(
                                tiny_http::Response::from_string(error.to_string())
                                    .with_status_code(500),
                            );
                            continue;
                        }
                    }
                };

                let response_body = serde_json::json!({
                    "id": "resp_stub",
                    "object": "response",
                    "model": parsed.get("model").cloned().unwrap_or(Value::String("stub-model".to_owned())),
                    "output": [
                        {
                            "type": "message",
                            "role": "assistant",
                            "content": [
                                { "type": "output_text", "text": output_text }
                            ]
                        }
                    ],
                    "output_text": output_text
                });

                let mut response = tiny_http::Response::from_string(response_body.to_string())
                    .with_status_code(200);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                response = response.with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            prompts,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Prompts received so far, in arrival order.
    #[allow(dead_code)]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock prompts").clone()
    }
}

impl Drop for OpenAiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn extract_between<'a>(text: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    let start = text.find(begin)? + begin.len();
    let rest = &text[start..];
    let end_rel = rest.find(end)?;
    Some(&rest[..end_rel])
}

fn draft_response() -> String {
    "```markdown\n\
---\n\
title: \"Testes Automatizados na Prática\"\n\
date: \"2020-01-01\"\n\
tags: [\"testes\", \"qualidade\"]\n\
excerpt: \"Como começar com testes automatizados\"\n\
---\n\
\n\
# Testes Automatizados na Prática\n\
\n\
Conteúdo do artigo.\n\
```\n"
        .to_owned()
}

fn translate_response(post: &str) -> String {
    post.replace("Testes Automatizados na Prática", "Automated Testing in Practice")
        .replace("Como começar com testes automatizados", "Getting started with automated tests")
        .replace("Conteúdo do artigo.", "Article content.")
}
