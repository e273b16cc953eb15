use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::ExploitDbError;

impl IntoResponse for ExploitDbError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ExploitDbError::Config(_) => StatusCode::BAD_REQUEST,
            ExploitDbError::Unsupported { .. } => StatusCode::NOT_IMPLEMENTED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_maps_to_501() {
        let resp = ExploitDbError::unsupported("get_exploit_all", "redis").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_config_maps_to_400() {
        let resp = ExploitDbError::Config("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_connection_maps_to_500() {
        let resp = ExploitDbError::connection("redis", "redis://x", "refused").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
