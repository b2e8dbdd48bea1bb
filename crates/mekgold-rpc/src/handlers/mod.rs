// crates/mekgold-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for one API group.
//
// Handlers return `Err(String)` only for store faults. Expected engine
// outcomes (too soon, empty slot, ...) are successful calls whose body
// carries `success: false`, `error` and `error_kind`.

pub mod income;
pub mod rates;
pub mod slots;

use mekgold_income::IncomeError;

/// An expected engine failure as reported in a response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub error: String,
    pub error_kind: String,
}

/// Turn an engine error into a body-level `Failure`, or into a handler
/// error if it is a store fault.
pub fn into_failure(e: IncomeError) -> Result<Failure, String> {
    if e.is_fatal() {
        tracing::error!("Store fault while handling request: {}", e);
        return Err(e.to_string());
    }
    Ok(Failure {
        error: e.to_string(),
        error_kind: e.kind().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mekgold_core::MekGoldError;

    #[test]
    fn test_into_failure() {
        let f = into_failure(IncomeError::TooSoon { elapsed_ms: 5 }).unwrap();
        assert_eq!(f.error_kind, "too_soon");

        let err = into_failure(IncomeError::Store(MekGoldError::Storage("io".into())));
        assert_eq!(err.unwrap_err(), "Storage error: io");
    }
}
