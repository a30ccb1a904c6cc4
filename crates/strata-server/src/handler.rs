use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use strata_lifecycle::LifecycleAction;
use strata_protocol::{
    ApiResponse, CreateEntityBody, TransitionBody, UpdateEntityBody, WarningBody, WriteResponse,
    CACHE_CONTROL_VALUE, PROTOCOL_VERSION,
};
use strata_repo::{CreateRequest, RepoError, RepoWarning, UpdateRequest, WriteOutcome};
use strata_store::paths;
use strata_types::{AccessTier, EntityId, EntityStatus, Etag, OrgId, RoleTier, TypeId};

use crate::auth;
use crate::error::{ServerError, ServerResult};
use crate::state::{AppState, CachedResponse};

// ---- Liveness ----

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "strata-server",
        "version": env!("CARGO_PKG_VERSION"),
        "protocolVersion": PROTOCOL_VERSION,
    }))
}

// ---- Snapshot reads ----

/// `GET /manifests/site` — the manifest for the caller's resolved tier.
pub async fn site_manifest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    serve_manifest(&state, &ctx.tier, &headers)
}

/// `GET /bundles/{typeId}` — one type's bundle at the caller's tier.
pub async fn bundle_handler(
    State(state): State<AppState>,
    Path(type_id): Path<TypeId>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    serve_bundle(&state, &type_id, &ctx.tier, &headers)
}

/// `GET /orgs/{orgId}/manifests/site` — explicit org-scoped manifest.
pub async fn org_manifest_handler(
    State(state): State<AppState>,
    Path(org): Path<OrgId>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    let role = ctx.require_org(&org)?;
    serve_manifest(&state, &AccessTier::Org { org, role }, &headers)
}

/// `GET /orgs/{orgId}/bundles/{typeId}` — explicit org-scoped bundle.
pub async fn org_bundle_handler(
    State(state): State<AppState>,
    Path((org, type_id)): Path<(OrgId, TypeId)>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    let role = ctx.require_org(&org)?;
    serve_bundle(&state, &type_id, &AccessTier::Org { org, role }, &headers)
}

fn serve_manifest(
    state: &AppState,
    tier: &AccessTier,
    headers: &HeaderMap,
) -> ServerResult<Response> {
    let key = paths::manifest_path(tier);
    let revision = state.store.revision();
    if let Some(cached) = state.responses.get(&key, revision) {
        return Ok(snapshot_response(headers, cached.body, &cached.etag));
    }
    let built = state.snapshots.build_manifest(tier)?;
    let landed = land_snapshot(state, &key, &built.body)?;
    let body = envelope(&built.body);
    cache_response(state, &key, &body, &built.etag, revision + u64::from(landed));
    Ok(snapshot_response(headers, body, &built.etag))
}

fn serve_bundle(
    state: &AppState,
    type_id: &TypeId,
    tier: &AccessTier,
    headers: &HeaderMap,
) -> ServerResult<Response> {
    let key = paths::bundle_path(tier, type_id);
    let revision = state.store.revision();
    if let Some(cached) = state.responses.get(&key, revision) {
        return Ok(snapshot_response(headers, cached.body, &cached.etag));
    }
    let built = state.snapshots.build_bundle(type_id, tier)?;
    let landed = land_snapshot(state, &key, &built.body)?;
    let body = envelope(&built.body);
    cache_response(state, &key, &body, &built.etag, revision + u64::from(landed));
    Ok(snapshot_response(headers, body, &built.etag))
}

/// Splice the canonical snapshot body into the success envelope without
/// re-serializing it, so the enveloped bytes stay as deterministic as
/// the body itself. The ETag names the canonical body.
fn envelope(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 24);
    out.extend_from_slice(b"{\"success\":true,\"data\":");
    out.extend_from_slice(body);
    out.push(b'}');
    out
}

/// Land the built body at the snapshot's canonical path, but only when
/// the bytes changed. An identical rebuild must not bump the store
/// revision, or it would invalidate every other cached snapshot.
/// Returns whether a write actually landed.
fn land_snapshot(state: &AppState, key: &str, body: &[u8]) -> ServerResult<bool> {
    if state.store.read(key)?.as_deref() != Some(body) {
        state.store.write(key, body)?;
        return Ok(true);
    }
    Ok(false)
}

/// Record the built body against the revision it actually reflects: the
/// pre-build revision plus the landing write. A mutation that slips in
/// between the build and this stamp leaves the recorded revision behind
/// the live one, so the entry is rebuilt rather than served stale.
fn cache_response(state: &AppState, key: &str, body: &[u8], etag: &Etag, revision: u64) {
    state.responses.put(
        key,
        CachedResponse {
            revision,
            etag: etag.clone(),
            body: body.to_vec(),
        },
    );
}

/// 200 with the body, or 304 when the caller's `If-None-Match` already
/// names the current content. Both carry the ETag and cache directives.
fn snapshot_response(headers: &HeaderMap, body: Vec<u8>, etag: &Etag) -> Response {
    let cached = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Etag::parse_header(v).ok());

    let common = [
        (header::ETAG, etag.quoted()),
        (header::CACHE_CONTROL, CACHE_CONTROL_VALUE.to_string()),
    ];
    if cached.as_ref() == Some(etag) {
        (StatusCode::NOT_MODIFIED, common).into_response()
    } else {
        (
            StatusCode::OK,
            common,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

// ---- Entity writes ----

/// `POST /orgs/{orgId}/entities` — create a draft.
pub async fn create_entity_handler(
    State(state): State<AppState>,
    Path(org): Path<OrgId>,
    headers: HeaderMap,
    Json(body): Json<CreateEntityBody>,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    ctx.require_org(&org)?;

    let outcome = state.repo.create(CreateRequest {
        entity_type_id: body.entity_type_id,
        organization_id: Some(org),
        data: body.data,
        visibility: body.visibility,
        slug: body.slug,
        actor: ctx.actor,
    })?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(write_response(outcome))),
    )
        .into_response())
}

/// `GET /orgs/{orgId}/entities/{id}` — latest version, membership required.
pub async fn get_entity_handler(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgId, EntityId)>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    let role = ctx.require_org(&org)?;

    let entity = state.repo.get_latest(&id)?;
    if entity.organization_id != Some(org) {
        return Err(RepoError::EntityNotFound(id).into());
    }
    // Soft-deleted entities stay restorable, but only admins see them.
    if entity.status == EntityStatus::Deleted && role != RoleTier::Admin {
        return Err(RepoError::EntityNotFound(id).into());
    }
    Ok(Json(ApiResponse::ok(entity)).into_response())
}

/// `PATCH /orgs/{orgId}/entities/{id}` — edit a draft with an optimistic
/// version check. A stale `expectedVersion` is retried once against the
/// live version; only a second conflict surfaces as 409.
pub async fn update_entity_handler(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgId, EntityId)>,
    headers: HeaderMap,
    Json(body): Json<UpdateEntityBody>,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    ctx.require_org(&org)?;

    let stub = state.repo.stub(&id)?;
    if stub.organization_id != Some(org) {
        return Err(RepoError::EntityNotFound(id).into());
    }
    let outcome = state.repo.update_with_retry(UpdateRequest {
        entity_id: id,
        expected_version: body.expected_version,
        data: body.data,
        visibility: body.visibility,
        slug: body.slug,
        actor: ctx.actor,
    })?;
    Ok(Json(ApiResponse::ok(write_response(outcome))).into_response())
}

/// `DELETE /orgs/{orgId}/entities/{id}` — superadmin hard purge.
pub async fn delete_entity_handler(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrgId, EntityId)>,
    headers: HeaderMap,
) -> ServerResult<StatusCode> {
    let ctx = auth::resolve(&headers)?;
    ctx.require_superadmin()?;

    let stub = state.repo.stub(&id)?;
    if stub.organization_id != Some(org) {
        return Err(RepoError::EntityNotFound(id).into());
    }
    state.repo.hard_delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /entities/{id}/transition` — run a lifecycle action.
pub async fn transition_handler(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    headers: HeaderMap,
    Json(body): Json<TransitionBody>,
) -> ServerResult<Response> {
    let ctx = auth::resolve(&headers)?;
    let action: LifecycleAction =
        serde_json::from_value(serde_json::Value::String(body.action.clone()))
            .map_err(|_| ServerError::BadRequest(format!("unknown action \"{}\"", body.action)))?;

    let stub = state.repo.stub(&id)?;
    let authority = match stub.organization_id {
        Some(org) => ctx.require_org(&org)? == RoleTier::Admin,
        // Global entities are platform-managed.
        None => {
            ctx.require_superadmin()?;
            true
        }
    };

    let entity = state.repo.transition(
        &id,
        action,
        body.feedback.as_deref(),
        &ctx.actor,
        authority,
    )?;
    Ok(Json(ApiResponse::ok(WriteResponse {
        entity,
        warnings: Vec::new(),
    }))
    .into_response())
}

fn write_response(outcome: WriteOutcome) -> WriteResponse {
    WriteResponse {
        entity: outcome.entity,
        warnings: outcome.warnings.into_iter().map(warning_body).collect(),
    }
}

fn warning_body(warning: RepoWarning) -> WarningBody {
    match warning {
        RepoWarning::DuplicateName { name, existing } => WarningBody {
            code: "duplicateName".into(),
            message: format!("another entity named \"{name}\" exists ({existing})"),
        },
    }
}
