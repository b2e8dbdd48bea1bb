// crates/mekgold-cli/src/rpc_client.rs
//
// Lightweight JSON-RPC client that POSTs to the mekgold-daemon HTTP endpoint.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use mekgold_rpc::{JsonRpcRequest, JsonRpcResponse, SERVICE_NAME};

/// Errors raised while talking to the daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC response for {0} carried no result")]
    EmptyResult(String),
}

/// URL the daemon's JSON-RPC service answers on.
pub fn service_url(endpoint: &str) -> String {
    format!("{}/{}/Call", endpoint.trim_end_matches('/'), SERVICE_NAME)
}

/// Send a JSON-RPC call to the daemon and return the parsed envelope.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, ClientError> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(service_url(endpoint))
        .json(&request)
        .send()
        .await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// Call `method` with typed params and decode the typed result.
pub async fn call<P, R>(endpoint: &str, method: &str, params: &P) -> Result<R, ClientError>
where
    P: Serialize,
    R: DeserializeOwned,
{
    let response = rpc_call(endpoint, method, serde_json::to_value(params)?).await?;
    unwrap_envelope(method, response)
}

fn unwrap_envelope<R: DeserializeOwned>(method: &str, response: JsonRpcResponse) -> Result<R, ClientError> {
    if !response.success {
        return Err(ClientError::Rpc(
            response.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    let result = response
        .result
        .ok_or_else(|| ClientError::EmptyResult(method.to_string()))?;
    Ok(serde_json::from_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mekgold_rpc::handlers::income::DailyRateResponse;

    #[test]
    fn test_service_url() {
        assert_eq!(
            service_url("http://localhost:50051/"),
            "http://localhost:50051/mekgold.rpc.IncomeService/Call"
        );
    }

    #[test]
    fn test_unwrap_envelope_decodes_result() {
        let response = JsonRpcResponse {
            success: true,
            result: Some(serde_json::json!({
                "total_daily_rate": 160.5,
                "active_slots": 2,
                "total_slots": 3
            })),
            error: None,
        };
        let rate: DailyRateResponse = unwrap_envelope("income/daily_rate", response).unwrap();
        assert_eq!(rate.active_slots, 2);
        assert_eq!(rate.total_daily_rate, 160.5);
    }

    #[test]
    fn test_unwrap_envelope_surfaces_failures() {
        let failed = JsonRpcResponse {
            success: false,
            result: None,
            error: Some("Unknown method: income/nope".to_string()),
        };
        let err = unwrap_envelope::<DailyRateResponse>("income/nope", failed).unwrap_err();
        assert!(matches!(err, ClientError::Rpc(ref m) if m.contains("income/nope")));

        let empty = JsonRpcResponse {
            success: true,
            result: None,
            error: None,
        };
        let err = unwrap_envelope::<DailyRateResponse>("income/daily_rate", empty).unwrap_err();
        assert!(matches!(err, ClientError::EmptyResult(_)));
    }
}
