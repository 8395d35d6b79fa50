use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use tracing::error;

pub async fn root_handler(
    axum::Extension(index_file): axum::Extension<PathBuf>,
) -> impl IntoResponse {
    match tokio::fs::read_to_string(&index_file).await {
        Ok(contents) => Html(contents).into_response(),
        Err(err) => {
            error!(path = %index_file.display(), "failed to read index: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn health_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_serves_index_file() {
        let dir = std::env::temp_dir().join(format!("pageboard-index-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let index = dir.join("index.html");
        tokio::fs::write(&index, "<canvas id=\"drawing-board\"></canvas>")
            .await
            .unwrap();

        let response = root_handler(axum::Extension(index)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn missing_index_is_a_server_error() {
        let missing = std::env::temp_dir().join("pageboard-missing/index.html");
        let response = root_handler(axum::Extension(missing)).await.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_is_no_content() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
