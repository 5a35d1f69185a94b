// src/testing.rs
//! In-process stand-in for the Roblox games API and JSONBin, used by tests.
use std::collections::{ HashMap, VecDeque };
use std::sync::Mutex;
use std::time::Duration;
use actix_web::dev::ServerHandle;
use actix_web::{ web, App, HttpRequest, HttpResponse, HttpServer };

pub enum MockReply {
    Page(serde_json::Value),
    /// Answers with the page after holding the request open.
    Delayed(Duration, serde_json::Value),
    Status(u16),
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct ListRequest {
    pub place_id: String,
    pub cursor: Option<String>,
    pub limit: Option<String>,
    pub cookie: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoreWrite {
    pub bin_id: String,
    pub master_key: Option<String>,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Default)]
pub struct MockUpstream {
    replies: Mutex<VecDeque<MockReply>>,
    list_requests: Mutex<Vec<ListRequest>>,
    store_writes: Mutex<Vec<StoreWrite>>,
    store_rejection: Mutex<Option<(u16, String)>>,
    arrivals: Mutex<Vec<&'static str>>,
}

impl MockUpstream {
    pub fn push_reply(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn reject_store_writes(&self, status: u16, body: &str) {
        *self.store_rejection.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn list_requests(&self) -> Vec<ListRequest> {
        self.list_requests.lock().unwrap().clone()
    }

    pub fn store_writes(&self) -> Vec<StoreWrite> {
        self.store_writes.lock().unwrap().clone()
    }

    /// "list" or "write" per request, in the order requests reached the mock.
    pub fn arrivals(&self) -> Vec<&'static str> {
        self.arrivals.lock().unwrap().clone()
    }

    pub fn outbound_calls(&self) -> usize {
        self.list_requests.lock().unwrap().len() + self.store_writes.lock().unwrap().len()
    }
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn failure(code: u16, body: String) -> HttpResponse {
    let code = actix_web::http::StatusCode::from_u16(code)
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(code).body(body)
}

async fn list_servers(
    req: HttpRequest,
    place_id: web::Path<String>,
    query: web::Query<HashMap<String, String>>,
    mock: web::Data<MockUpstream>,
) -> HttpResponse {
    mock.arrivals.lock().unwrap().push("list");
    mock.list_requests.lock().unwrap().push(ListRequest {
        place_id: place_id.into_inner(),
        cursor: query.get("cursor").cloned(),
        limit: query.get("limit").cloned(),
        cookie: header(&req, "cookie"),
    });

    let reply = mock.replies.lock().unwrap().pop_front();
    match reply {
        Some(MockReply::Page(body)) => HttpResponse::Ok().json(body),
        Some(MockReply::Delayed(delay, body)) => {
            actix_web::rt::time::sleep(delay).await;
            HttpResponse::Ok().json(body)
        }
        Some(MockReply::Status(code)) => failure(code, "mock failure".to_string()),
        Some(MockReply::Raw(body)) => HttpResponse::Ok().content_type("application/json").body(body),
        None => HttpResponse::Ok().json(serde_json::json!({ "data": [], "nextPageCursor": null })),
    }
}

async fn put_bin(
    req: HttpRequest,
    bin_id: web::Path<String>,
    body: web::Bytes,
    mock: web::Data<MockUpstream>,
) -> HttpResponse {
    mock.arrivals.lock().unwrap().push("write");
    if let Some((code, text)) = mock.store_rejection.lock().unwrap().clone() {
        return failure(code, text);
    }
    mock.store_writes.lock().unwrap().push(StoreWrite {
        bin_id: bin_id.into_inner(),
        master_key: header(&req, "x-master-key"),
        content_type: header(&req, "content-type"),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    });
    HttpResponse::Ok().json(serde_json::json!({ "metadata": { "private": true } }))
}

/// Starts the mock on an ephemeral port and returns its base URL.
pub async fn spawn(mock: web::Data<MockUpstream>) -> std::io::Result<(String, ServerHandle)> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(mock.clone())
            .route("/v1/games/{place_id}/servers/Public", web::get().to(list_servers))
            .route("/v3/b/{bin_id}", web::put().to(put_bin))
    })
        .workers(1)
        .bind(("127.0.0.1", 0))?;

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    Ok((format!("http://{}", addr), handle))
}
