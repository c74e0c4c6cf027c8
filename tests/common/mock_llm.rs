// Mock OpenAI-compatible chat completions server
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use actix_web::{HttpRequest, HttpResponse, HttpServer, dev::ServerHandle, post, web};
use serde_json::{Value, json};

/// One scripted reply: HTTP status plus raw body.
#[derive(Clone)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
}

impl Scripted {
    pub fn answer(content: &str) -> Self {
        Self::json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
    }

    pub fn tool_call(id: &str, name: &str, arguments: Value) -> Self {
        Self::json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": id,
                        "type": "function",
                        "function": {"name": name, "arguments": arguments.to_string()}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
    }

    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Default)]
struct MockState {
    replies: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Value>>,
    auth_headers: Mutex<Vec<Option<String>>>,
}

pub struct MockLlm {
    state: Arc<MockState>,
    handle: ServerHandle,
    pub base_url: String,
}

#[post("/v1/chat/completions")]
async fn chat_completions(
    req: HttpRequest,
    body: web::Json<Value>,
    state: web::Data<MockState>,
) -> HttpResponse {
    state.requests.lock().unwrap().push(body.into_inner());
    state.auth_headers.lock().unwrap().push(
        req.headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    let reply = state.replies.lock().unwrap().pop_front();
    match reply {
        Some(reply) => {
            let status = actix_web::http::StatusCode::from_u16(reply.status)
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status)
                .content_type("application/json")
                .body(reply.body)
        }
        None => HttpResponse::InternalServerError().body("no scripted reply left"),
    }
}

impl MockLlm {
    /// Starts the server on an ephemeral port. Must run inside an actix system.
    pub async fn start(replies: Vec<Scripted>) -> Self {
        let state = Arc::new(MockState {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        });
        let data = web::Data::from(state.clone());

        let server = HttpServer::new(move || {
            actix_web::App::new()
                .app_data(data.clone())
                .service(chat_completions)
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock llm");
        let port = server.addrs()[0].port();
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            state,
            handle,
            base_url: format!("http://127.0.0.1:{}/v1", port),
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.state.auth_headers.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
