use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;

use crate::{api::http::comments as comments_http, app::state::AppState, telemetry};

pub fn build_router(state: AppState) -> Router {
    let origin = std::env::var("CORS_ALLOWED_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:5173".to_string());
    let origin = origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173"));
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Approve and delete sit on the admin origin behind the site's auth
    // proxy; this service does not authenticate.
    Router::new()
        .route(
            "/posts/{post_id}/comments",
            get(comments_http::list_post_comments_handle)
                .post(comments_http::submit_comment_handle),
        )
        .route(
            "/posts/{post_id}/comments/thread",
            get(comments_http::get_post_thread_handle),
        )
        .route(
            "/comments/{comment_id}/approve",
            post(comments_http::approve_comment_handle),
        )
        .route(
            "/comments/{comment_id}",
            delete(comments_http::delete_comment_handle),
        )
        .layer(middleware::from_fn(telemetry::request_logging_middleware))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Validation failures are rejected before any query runs, so a lazy
    // pool that never connects is enough here.
    fn test_router() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/comments_test")
            .expect("lazy pool");
        build_router(AppState::new(pool))
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn submit_with_short_content_is_rejected() {
        let body = serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "content": "abcd",
        });
        let response = test_router()
            .oneshot(post_json("/posts/1/comments", &body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("at least 5")
        );
    }

    #[tokio::test]
    async fn submit_with_malformed_email_is_rejected() {
        let body = serde_json::json!({
            "name": "Ada",
            "email": "not-an-email",
            "content": "Great write-up, thanks",
        });
        let response = test_router()
            .oneshot(post_json("/posts/1/comments", &body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn submit_under_non_positive_post_id_is_rejected() {
        let body = serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "content": "Great write-up, thanks",
        });
        let response = test_router()
            .oneshot(post_json("/posts/0/comments", &body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap()
                .contains("blog_post_id")
        );
    }

    #[tokio::test]
    async fn non_numeric_comment_id_is_rejected_by_the_path_extractor() {
        let request = Request::builder()
            .method("POST")
            .uri("/comments/abc/approve")
            .body(Body::empty())
            .expect("request");
        let response = test_router().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
