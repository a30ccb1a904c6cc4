//! HTTP server for Strata.
//!
//! Serves tier-scoped manifests and bundles with conditional fetch
//! (`If-None-Match` / 304), and hosts the entity write API: create,
//! draft edits with optimistic concurrency, lifecycle transitions, and
//! superadmin hard deletes. Caller identity arrives pre-authenticated in
//! gateway headers.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AuthContext, ACTOR_HEADER, ORG_HEADER, ROLE_HEADER};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::StrataServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use strata_store::InMemoryObjectStore;
    use strata_types::{
        EntityType, Etag, FieldDefinition, FieldKind, FieldSection, OrgId, TypeId, Visibility,
    };
    use tower::util::ServiceExt;

    use super::*;
    use crate::auth::{ACTOR_HEADER, ORG_HEADER, ROLE_HEADER};

    fn app_state() -> AppState {
        AppState::new(Arc::new(InMemoryObjectStore::new()))
    }

    fn article_type(state: &AppState) -> EntityType {
        let now = Utc::now();
        let etype = EntityType {
            id: TypeId::new(),
            name: "Article".into(),
            plural_name: "Articles".into(),
            slug: "articles".into(),
            fields: vec![FieldDefinition::new("name", FieldKind::Text, true)],
            sections: vec![FieldSection {
                id: "main".into(),
                name: "Main".into(),
                display_order: 0,
            }],
            default_visibility: Visibility::Members,
            allow_public: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.repo.registry().save(&etype).unwrap();
        etype
    }

    fn admin_request(org: &OrgId, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_HEADER, "u1")
            .header(ORG_HEADER, org.to_string())
            .header(ROLE_HEADER, "admin");
        match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_published(
        app: &axum::Router,
        org: &OrgId,
        etype: &EntityType,
        name: &str,
    ) -> String {
        let response = app
            .clone()
            .oneshot(admin_request(
                org,
                "POST",
                &format!("/orgs/{org}/entities"),
                Some(json!({
                    "entityTypeId": etype.id.to_string(),
                    "data": { "name": { "type": "text", "value": name } },
                    "visibility": "public",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        let id = body["data"]["entity"]["id"].as_str().unwrap().to_string();

        for action in ["submitForApproval", "approve"] {
            let response = app
                .clone()
                .oneshot(admin_request(
                    org,
                    "POST",
                    &format!("/entities/{id}/transition"),
                    Some(json!({ "action": action })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "action {action}");
        }
        id
    }

    #[tokio::test]
    async fn health_and_info() {
        let app = router::build_router(app_state());
        for uri in ["/health", "/info"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn create_publish_and_fetch_public_bundle() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);

        create_published(&app, &org, &etype, "Hello World").await;

        // Anonymous fetch sees the published public entity.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/bundles/{}", etype.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let etag = response
            .headers()
            .get(header::ETAG)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["entityCount"], 1);
        assert_eq!(body["data"]["entities"][0]["slug"], "hello-world");

        // A stale tag gets the full body again, under the current tag.
        let stale = Etag::from_bytes(b"an older build").quoted();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/bundles/{}", etype.id))
                    .header(header::IF_NONE_MATCH, &stale)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ETAG).unwrap().to_str().unwrap(),
            etag
        );
        let body = json_body(response).await;
        assert_eq!(body["data"]["entityCount"], 1);

        // Revalidating with the same tag short-circuits to 304.
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/bundles/{}", etype.id))
                    .header(header::IF_NONE_MATCH, &etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(
            response.headers().get(header::ETAG).unwrap().to_str().unwrap(),
            etag
        );
    }

    #[tokio::test]
    async fn anonymous_manifest_lists_public_types() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);
        create_published(&app, &org, &etype, "Post").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/manifests/site")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["entityTypes"][0]["id"], etype.id.to_string());
        assert_eq!(body["data"]["entityTypes"][0]["entityCount"], 1);
    }

    #[tokio::test]
    async fn org_routes_reject_foreign_members() {
        let state = app_state();
        article_type(&state);
        let app = router::build_router(state);

        let own = OrgId::new();
        let other = OrgId::new();
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/orgs/{other}/manifests/site"))
                    .header(ACTOR_HEADER, "u1")
                    .header(ORG_HEADER, own.to_string())
                    .header(ROLE_HEADER, "member")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "forbidden");
    }

    #[tokio::test]
    async fn missing_required_field_is_422() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);

        let response = app
            .oneshot(admin_request(
                &org,
                "POST",
                &format!("/orgs/{org}/entities"),
                Some(json!({
                    "entityTypeId": etype.id.to_string(),
                    "data": {},
                    "slug": "empty",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "validation");
    }

    #[tokio::test]
    async fn stale_expected_version_recovers_once() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);

        let response = app
            .clone()
            .oneshot(admin_request(
                &org,
                "POST",
                &format!("/orgs/{org}/entities"),
                Some(json!({
                    "entityTypeId": etype.id.to_string(),
                    "data": { "name": { "type": "text", "value": "Draft" } },
                })),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        let id = body["data"]["entity"]["id"].as_str().unwrap().to_string();

        let patch = |expected: u32, name: &str| {
            admin_request(
                &org,
                "PATCH",
                &format!("/orgs/{org}/entities/{id}"),
                Some(json!({
                    "expectedVersion": expected,
                    "data": { "name": { "type": "text", "value": name } },
                })),
            )
        };
        let response = app.clone().oneshot(patch(1, "Draft 2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The first patch moved storage to v2, so expecting v1 again is
        // stale; the delta is re-applied against the live version once.
        let response = app.oneshot(patch(1, "Draft 3")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["entity"]["version"], 3);
        assert_eq!(
            body["data"]["entity"]["data"]["name"]["value"],
            "Draft 3"
        );
    }

    #[tokio::test]
    async fn illegal_transition_is_409() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);
        let id = create_published(&app, &org, &etype, "Live").await;

        let response = app
            .oneshot(admin_request(
                &org,
                "POST",
                &format!("/entities/{id}/transition"),
                Some(json!({ "action": "approve" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "illegalTransition");
    }

    #[tokio::test]
    async fn member_cannot_approve() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);

        let response = app
            .clone()
            .oneshot(admin_request(
                &org,
                "POST",
                &format!("/orgs/{org}/entities"),
                Some(json!({
                    "entityTypeId": etype.id.to_string(),
                    "data": { "name": { "type": "text", "value": "Pending" } },
                })),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        let id = body["data"]["entity"]["id"].as_str().unwrap().to_string();

        let transition = |role: &'static str, action: &str| {
            Request::builder()
                .method("POST")
                .uri(format!("/entities/{id}/transition"))
                .header(ACTOR_HEADER, "u2")
                .header(ORG_HEADER, org.to_string())
                .header(ROLE_HEADER, role)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "action": action }).to_string()))
                .unwrap()
        };
        let response = app
            .clone()
            .oneshot(transition("member", "submitForApproval"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(transition("member", "approve")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn hard_delete_requires_superadmin() {
        let state = app_state();
        let etype = article_type(&state);
        let org = OrgId::new();
        let app = router::build_router(state);
        let id = create_published(&app, &org, &etype, "Doomed").await;

        let response = app
            .clone()
            .oneshot(admin_request(
                &org,
                "DELETE",
                &format!("/orgs/{org}/entities/{id}"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/orgs/{org}/entities/{id}"))
                    .header(ACTOR_HEADER, "root")
                    .header(ROLE_HEADER, "superadmin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(admin_request(
                &org,
                "GET",
                &format!("/orgs/{org}/entities/{id}"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_bundle_type_is_404() {
        let app = router::build_router(app_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/bundles/{}", TypeId::new()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
