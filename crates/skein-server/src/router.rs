use axum::routing::{get, post};
use axum::Router;
use skein_proto::endpoints;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::ServerState;

/// Build the axum router with all Skein sync endpoints.
///
/// `get` also serves HEAD (axum strips the body), which is what clients
/// use for blob existence checks.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health))
        .route(endpoints::DEVICE_AUTH, post(handler::device_auth))
        .route(endpoints::DEVICE_TOKEN, post(handler::device_token))
        .route(
            endpoints::PROJECT_ROUTE,
            get(handler::get_project)
                .patch(handler::patch_project)
                .post(handler::create_project),
        )
        .route(
            endpoints::BLOB_ROUTE,
            get(handler::get_blob).put(handler::put_blob),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AllowAllAuth, StaticTokenAuth};
    use crate::config::ServerConfig;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use skein_store::InMemoryContentStore;
    use skein_tree::FileTree;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn open_state() -> ServerState {
        ServerState::new(ServerConfig::default(), Arc::new(AllowAllAuth))
    }

    async fn send(
        router: Router,
        method: Method,
        uri: &str,
        body: Vec<u8>,
        token: Option<&str>,
    ) -> axum::http::Response<Body> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        router.oneshot(req.body(Body::from(body)).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn project_state_roundtrip() {
        let state = open_state();
        state.create_project("p").unwrap();
        let router = build_router(state.clone());

        // Push a delta from a client-side tree.
        let client = FileTree::new(Arc::new(InMemoryContentStore::new()));
        client.write_file("/hello.txt", b"hi").unwrap();
        let resp = send(
            router.clone(),
            Method::PATCH,
            "/api/projects/p",
            client.encode_state(),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(state.project("p").unwrap().tree.contains_file("/hello.txt"));

        // And read the full state back.
        let resp = send(router, Method::GET, "/api/projects/p", vec![], None).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_update_is_bad_request() {
        let state = open_state();
        state.create_project("p").unwrap();
        let router = build_router(state);
        let resp = send(
            router,
            Method::PATCH,
            "/api/projects/p",
            vec![0xff, 0xff, 0xff, 0xff, 0x01],
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blob_upload_and_fetch() {
        let state = open_state();
        state.create_project("p").unwrap();
        let router = build_router(state);
        let hash = skein_types::BlobHash::from_bytes(b"blob bytes");

        let uri = format!("/api/projects/p/blobs/{}", hash.to_hex());
        let resp = send(
            router.clone(),
            Method::PUT,
            &uri,
            b"blob bytes".to_vec(),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send(router.clone(), Method::HEAD, &uri, vec![], None).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(router, Method::GET, &uri, vec![], None).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn blob_upload_with_wrong_hash_is_rejected() {
        let state = open_state();
        state.create_project("p").unwrap();
        let router = build_router(state);
        let hash = skein_types::BlobHash::from_bytes(b"expected");

        let uri = format!("/api/projects/p/blobs/{}", hash.to_hex());
        let resp = send(router, Method::PUT, &uri, b"different".to_vec(), None).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn missing_blob_is_404() {
        let state = open_state();
        state.create_project("p").unwrap();
        let router = build_router(state);
        let hash = skein_types::BlobHash::from_bytes(b"never uploaded");
        let uri = format!("/api/projects/p/blobs/{}", hash.to_hex());
        let resp = send(router, Method::GET, &uri, vec![], None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn token_auth_is_enforced() {
        let state = ServerState::new(
            ServerConfig::default(),
            Arc::new(StaticTokenAuth::single("secret", "alice")),
        );
        state.create_project("p").unwrap();
        let router = build_router(state);

        let resp = send(router.clone(), Method::GET, "/api/projects/p", vec![], None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = send(
            router.clone(),
            Method::GET,
            "/api/projects/p",
            vec![],
            Some("wrong"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = send(router, Method::GET, "/api/projects/p", vec![], Some("secret")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_needs_no_auth() {
        let state = ServerState::new(
            ServerConfig::default(),
            Arc::new(StaticTokenAuth::single("secret", "alice")),
        );
        let router = build_router(state);
        let resp = send(router, Method::GET, "/api/health", vec![], None).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn device_flow_over_http() {
        let state = open_state();
        let router = build_router(state.clone());

        let body = serde_json::to_vec(&skein_proto::DeviceAuthRequest {
            client_name: "test-cli".into(),
        })
        .unwrap();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/device")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let auth: skein_proto::DeviceAuthResponse = serde_json::from_slice(&bytes).unwrap();

        state.approve_device(&auth.user_code, "tok", "alice");

        let body = serde_json::to_vec(&skein_proto::DevicePollRequest {
            device_code: auth.device_code,
        })
        .unwrap();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/device/token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        let poll: skein_proto::DevicePollResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(matches!(
            poll,
            skein_proto::DevicePollResponse::Granted { .. }
        ));
    }
}
