// crates/mekgold-rpc/src/server.rs
//
// RPC server setup: MekGoldRpcServer and RpcConfig.
//
// Uses a JSON-RPC-over-gRPC approach. A single tonic unary service accepts
// JSON-encoded requests with a method field, dispatches to the appropriate
// handler, and returns JSON-encoded responses.
//
// Methods:
//   rates/evaluate      slots/assign        slots/unassign
//   income/preview      income/collect      income/collect_all
//   income/daily_rate   income/pending

use std::sync::Arc;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tonic::transport::Server;
use tonic::Status;

use mekgold_core::IncomeStore;
use mekgold_income::{AggregateReporter, CheckpointCollector, IncomePolicy};

use crate::handlers;
use crate::middleware;

/// gRPC service name; requests are POSTed to `/{SERVICE_NAME}/Call`.
pub const SERVICE_NAME: &str = "mekgold.rpc.IncomeService";

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
/// The client sends a method name and a JSON params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "income/collect").
    pub method: String,
    /// JSON-encoded parameters for the method.
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
///
/// `success: false` here means the call itself failed (unknown method, bad
/// params, store fault). Engine outcomes such as "too soon" arrive as a
/// successful envelope whose `result` has `success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// The result data (if success).
    pub result: Option<serde_json::Value>,
    /// Error message (if not success).
    pub error: Option<String>,
}

impl JsonRpcResponse {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// MekGoldRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for the income engine.
///
/// Holds the shared store and exposes a tonic-based server with JSON-RPC
/// dispatching.
#[derive(Clone)]
pub struct MekGoldRpcServer {
    config: RpcConfig,
    store: Arc<dyn IncomeStore>,
    policy: IncomePolicy,
}

impl std::fmt::Debug for MekGoldRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MekGoldRpcServer")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish()
    }
}

impl MekGoldRpcServer {
    /// Create a new server over `store`.
    pub fn new(config: RpcConfig, store: Arc<dyn IncomeStore>) -> Self {
        Self {
            config,
            store,
            policy: IncomePolicy::default(),
        }
    }

    /// Set the collector policy used by assignment and collection methods.
    pub fn with_policy(mut self, policy: IncomePolicy) -> Self {
        self.policy = policy;
        self
    }

    fn service(&self) -> MekGoldServiceImpl {
        MekGoldServiceImpl {
            store: self.store.clone(),
            collector: CheckpointCollector::new(self.store.clone()).with_policy(self.policy),
            reporter: AggregateReporter::new(self.store.clone()),
        }
    }

    /// Dispatch one request in-process, without the transport.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.service().dispatch(request).await
    }

    /// Start the RPC server and listen for requests.
    ///
    /// This binds to the configured address and serves requests until
    /// the process is terminated.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("MekGold RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                MekGoldJsonRpcServer::new(self.service()),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Shared state behind the tonic service.
#[derive(Clone)]
struct MekGoldServiceImpl {
    store: Arc<dyn IncomeStore>,
    collector: CheckpointCollector,
    reporter: AggregateReporter,
}

impl MekGoldServiceImpl {
    /// Dispatch a JSON-RPC request to the appropriate handler based on the method name.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let method = request.method.clone();
        let result = match request.method.as_str() {
            // Rates
            "rates/evaluate" => {
                dispatch_handler(request.params, |r| {
                    let store = self.store.clone();
                    async move { handlers::rates::handle_evaluate_rates(store.as_ref(), r).await }
                })
                .await
            }

            // Income
            "income/preview" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::income::handle_preview(&self.reporter, r).await
                })
                .await
            }
            "income/collect" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::income::handle_collect(&self.collector, r).await
                })
                .await
            }
            "income/collect_all" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::income::handle_collect_all(&self.collector, r).await
                })
                .await
            }
            "income/daily_rate" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::income::handle_daily_rate(&self.reporter, r).await
                })
                .await
            }
            "income/pending" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::income::handle_pending(&self.reporter, r).await
                })
                .await
            }

            // Slots
            "slots/assign" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::slots::handle_assign(&self.collector, r).await
                })
                .await
            }
            "slots/unassign" => {
                dispatch_handler(request.params, |r| async move {
                    handlers::slots::handle_unassign(&self.collector, r).await
                })
                .await
            }

            _ => Err(format!("Unknown method: {}", request.method)),
        };

        match result {
            Ok(value) => JsonRpcResponse {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => {
                tracing::warn!("RPC {} failed: {}", method, err);
                JsonRpcResponse::failed(err)
            }
        }
    }
}

/// Generic dispatch helper: deserialize params into a request type,
/// call the handler, and serialize the result to JSON.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// A single gRPC service with one method. The request and response bodies are
// raw JSON-encoded JsonRpcRequest/JsonRpcResponse bytes.

/// The tonic service wrapper. Accepts bytes, deserializes them as JSON-RPC,
/// and dispatches.
#[derive(Clone)]
pub struct MekGoldJsonRpcServer {
    inner: MekGoldServiceImpl,
}

impl std::fmt::Debug for MekGoldJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MekGoldJsonRpcServer").finish()
    }
}

impl MekGoldJsonRpcServer {
    fn new(inner: MekGoldServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for MekGoldJsonRpcServer {
    const NAME: &'static str = SERVICE_NAME;
}

impl<B> tower_service::Service<http::Request<B>> for MekGoldJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp =
                        JsonRpcResponse::failed(format!("Failed to read request body: {}", e));
                    return Ok(build_response(serde_json::to_vec(&resp).unwrap_or_default()));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp = JsonRpcResponse::failed(format!("Invalid JSON-RPC request: {}", e));
                    return Ok(build_response(serde_json::to_vec(&resp).unwrap_or_default()));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            let json = serde_json::to_vec(&rpc_response).unwrap_or_default();
            Ok(build_response(json))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build an HTTP response with the given JSON body.
fn build_response(json: Vec<u8>) -> http::Response<tonic::body::BoxBody> {
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}
