//! Mock compute service and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use compute_gui_lib::compute::ComputeClient;
use compute_gui_lib::definition::Definition;
use compute_gui_lib::state::{ComputeSettings, Session};
use shared::{BranchPath, CurvePayload, DataItem, DataTree, EvaluationResponse, MeshPayload};

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, String),
    Delayed(Duration, Value),
}

pub type Responder = Arc<dyn Fn(&Value) -> Reply + Send + Sync>;

/// One request as the mock received it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub route: &'static str,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    evaluate: Arc<Mutex<Responder>>,
    union: Arc<Mutex<Responder>>,
    /// Served under `/files/{name}` as (status, body)
    files: Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>,
}

pub struct MockCompute {
    pub url: String,
    state: MockState,
}

impl MockCompute {
    pub async fn start() -> Self {
        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            evaluate: Arc::new(Mutex::new(fixed(Reply::Json(response(Vec::new()))))),
            union: Arc::new(Mutex::new(fixed(Reply::Json(Value::Array(Vec::new()))))),
            files: Arc::new(Mutex::new(HashMap::new())),
        };

        let app = Router::new()
            .route("/grasshopper", post(evaluate))
            .route("/rhino/geometry/mesh/createbooleanunion", post(union))
            .route("/files/{name}", get(file))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/"),
            state,
        }
    }

    pub fn on_evaluate(&self, reply: Reply) {
        *self.state.evaluate.lock().unwrap() = fixed(reply);
    }

    pub fn on_evaluate_with(&self, responder: impl Fn(&Value) -> Reply + Send + Sync + 'static) {
        *self.state.evaluate.lock().unwrap() = Arc::new(responder);
    }

    pub fn on_union(&self, reply: Reply) {
        *self.state.union.lock().unwrap() = fixed(reply);
    }

    /// Serve `bytes` with `status` at `/files/{name}`; other names are 404
    pub fn serve_file(&self, name: &str, status: u16, bytes: impl Into<Vec<u8>>) {
        self.state
            .files
            .lock()
            .unwrap()
            .insert(name.to_string(), (status, bytes.into()));
    }

    pub fn files_url(&self) -> String {
        format!("{}files/", self.url)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn settings(&self) -> ComputeSettings {
        ComputeSettings {
            url: self.url.clone(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Session with a dummy definition loaded
    pub fn session(&self) -> Session {
        let mut session = Session::new(ComputeClient::new(&self.settings()).unwrap());
        session.load_definition(Definition::from_bytes("weav.gh", b"definition-bytes".to_vec()));
        session
    }
}

fn fixed(reply: Reply) -> Responder {
    Arc::new(move |_| reply.clone())
}

async fn evaluate(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let responder = state.evaluate.lock().unwrap().clone();
    respond(&state, "grasshopper", &headers, body, responder).await
}

async fn union(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let responder = state.union.lock().unwrap().clone();
    respond(&state, "createbooleanunion", &headers, body, responder).await
}

async fn file(State(state): State<MockState>, Path(name): Path<String>) -> Response {
    let served = state.files.lock().unwrap().get(&name).cloned();
    match served {
        Some((code, bytes)) => (StatusCode::from_u16(code).unwrap(), bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn respond(
    state: &MockState,
    route: &'static str,
    headers: &HeaderMap,
    body: Value,
    responder: Responder,
) -> Response {
    let reply = responder(&body);
    state.requests.lock().unwrap().push(Recorded {
        route,
        api_key: headers
            .get("RhinoComputeKey")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    match reply {
        Reply::Json(value) => Json(value).into_response(),
        Reply::Status(code, text) => (StatusCode::from_u16(code).unwrap(), text).into_response(),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            Json(value).into_response()
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────

pub fn response(values: Vec<DataTree>) -> Value {
    serde_json::to_value(EvaluationResponse {
        values,
        ..Default::default()
    })
    .unwrap()
}

pub fn tree(name: &str, branches: Vec<(Vec<u32>, Vec<DataItem>)>) -> DataTree {
    let mut tree = DataTree::new(name);
    for (path, items) in branches {
        tree.append(BranchPath::new(path), items);
    }
    tree
}

/// Two-point line at height `x`, tagged with its position
pub fn line(x: f64) -> CurvePayload {
    CurvePayload {
        points: vec![[x, 0.0, 0.0], [x, 1.0, 0.0]],
        closed: false,
        user_strings: vec![("index".to_string(), x.to_string())],
    }
}

/// Unit quad mesh offset along X
pub fn quad(offset: f64) -> MeshPayload {
    MeshPayload {
        vertices: vec![
            [offset, 0.0, 0.0],
            [offset + 1.0, 0.0, 0.0],
            [offset + 1.0, 1.0, 0.0],
            [offset, 1.0, 0.0],
        ],
        faces: vec![vec![0, 1, 2, 3]],
        user_strings: Vec::new(),
    }
}
