//! Route handlers for the inference server.
//!
//! The original service returned HTTP 200 for every outcome and made callers
//! fish for an `error` key; here errors keep the `{"error": ...}` body but map
//! to real status codes: 400 for a malformed multipart body, 422 for a
//! missing or undecodable upload, 500 for inference failures.

use std::sync::atomic::Ordering;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::Error;
use crate::server::state::SharedState;

/// Successful prediction response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub version: String,
}

/// Transport-level error: a message plus the status it maps to
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Decode(_) | Error::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("invalid multipart body: {}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed ({}): {}", self.status, self.message);
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// POST /predict - classify one uploaded image
pub async fn predict(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut upload: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await?);
            break;
        }
    }

    let bytes = upload.ok_or_else(|| ApiError::unprocessable("missing multipart field `file`"))?;

    state.total_requests.fetch_add(1, Ordering::Relaxed);

    // The forward pass is CPU-bound; keep it off the async runtime.
    let shared = state.clone();
    let prediction = tokio::task::spawn_blocking(move || shared.predictor.predict_bytes(&bytes))
        .await
        .map_err(|e| ApiError::internal(format!("inference task failed: {}", e)))??;

    info!(
        "Predicted class: {} (confidence: {:.4})",
        prediction.label, prediction.confidence
    );

    Ok(Json(PredictResponse {
        prediction: prediction.label,
    }))
}

/// GET /health - health check endpoint
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        total_requests: state.total_requests.load(Ordering::Relaxed),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::CLASS_NAMES;
    use crate::inference::Predictor;
    use crate::model::{WasteClassifier, WasteClassifierConfig};
    use crate::server::{router, state::AppState};
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "ecovis-test-boundary";

    fn test_router() -> axum::Router {
        let device = Default::default();
        let config = WasteClassifierConfig {
            num_classes: 6,
            input_size: 32,
            dropout_rate: 0.4,
            in_channels: 3,
            base_filters: 8,
        };
        let model = WasteClassifier::new(&config, &device);
        let predictor = Predictor::from_model(&config, model, device);
        router(Arc::new(AppState::new(predictor)))
    }

    fn multipart_request(field: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.png\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn png_bytes(r: u8, g: u8, b: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(48, 48, Rgb([r, g, b]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_predict_valid_image() {
        let response = test_router()
            .oneshot(multipart_request("file", &png_bytes(120, 200, 40)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let label = json["prediction"].as_str().unwrap();
        assert!(CLASS_NAMES.contains(&label));
    }

    #[tokio::test]
    async fn test_predict_garbage_bytes_is_422() {
        let response = test_router()
            .oneshot(multipart_request("file", b"\xde\xad\xbe\xef not an image"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert!(json["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_predict_empty_file_is_422() {
        let response = test_router()
            .oneshot(multipart_request("file", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert!(json["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_predict_missing_field_is_422() {
        let response = test_router()
            .oneshot(multipart_request("not_file", &png_bytes(10, 10, 10)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        // Two in-flight requests with different images each get a valid,
        // self-consistent answer; there is no shared request-scoped state.
        let app = test_router();
        let (a, b) = tokio::join!(
            app.clone().oneshot(multipart_request("file", &png_bytes(255, 0, 0))),
            app.clone().oneshot(multipart_request("file", &png_bytes(0, 0, 255))),
        );

        for response in [a.unwrap(), b.unwrap()] {
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert!(CLASS_NAMES.contains(&json["prediction"].as_str().unwrap()));
        }
    }
}
