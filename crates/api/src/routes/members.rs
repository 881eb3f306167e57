//! Member endpoints in two flavors: v1 binds the entity shape straight
//! from the request, v2 goes through request/response DTOs decoupled from
//! the entity.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::{Address, Member, MemberId};
use serde::{Deserialize, Serialize};
use store::ShopStore;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

/// v1: the request mirrors the entity, address included.
#[derive(Deserialize)]
pub struct CreateMemberEntityRequest {
    pub name: String,
    pub address: AddressRequest,
}

#[derive(Deserialize)]
pub struct AddressRequest {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

/// v2: a dedicated request DTO; the entity shape stays private to the
/// server.
#[derive(Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CreateMemberResponse {
    pub id: MemberId,
}

#[derive(Serialize)]
pub struct MemberDto {
    pub name: String,
}

/// v2 list wrapper; leaves room to grow the envelope without breaking
/// clients.
#[derive(Serialize)]
pub struct MemberListResponse {
    pub count: usize,
    pub data: Vec<MemberDto>,
}

#[derive(Serialize)]
pub struct UpdateMemberResponse {
    pub id: MemberId,
    pub name: String,
}

// -- Handlers --

/// POST /api/v1/members — entity-shaped registration.
#[tracing::instrument(skip(state, req))]
pub async fn create_v1<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateMemberEntityRequest>,
) -> Result<(StatusCode, Json<CreateMemberResponse>), ApiError> {
    let member = Member::new(
        req.name,
        Address::new(req.address.city, req.address.street, req.address.zipcode),
    );
    let id = state.member_service.join(member).await?;

    Ok((StatusCode::CREATED, Json(CreateMemberResponse { id })))
}

/// POST /api/v2/members — DTO registration; only the name crosses the wire.
#[tracing::instrument(skip(state, req))]
pub async fn create_v2<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<CreateMemberResponse>), ApiError> {
    let member = Member::new(req.name, Address::new("", "", ""));
    let id = state.member_service.join(member).await?;

    Ok((StatusCode::CREATED, Json(CreateMemberResponse { id })))
}

/// GET /api/v1/members — raw entity list.
#[tracing::instrument(skip(state))]
pub async fn list_v1<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Member>>, ApiError> {
    Ok(Json(state.member_service.members().await?))
}

/// GET /api/v2/members — DTO list inside an envelope.
#[tracing::instrument(skip(state))]
pub async fn list_v2<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<MemberListResponse>, ApiError> {
    let members = state.member_service.members().await?;
    let data: Vec<MemberDto> = members
        .into_iter()
        .map(|m| MemberDto { name: m.name })
        .collect();

    Ok(Json(MemberListResponse {
        count: data.len(),
        data,
    }))
}

/// PUT /api/v2/members/{id} — rename a member.
#[tracing::instrument(skip(state, req))]
pub async fn update_v2<S: ShopStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<UpdateMemberResponse>, ApiError> {
    let id = MemberId::from_uuid(id);
    state.member_service.update_name(id, &req.name).await?;
    let member = state.member_service.member(id).await?;

    Ok(Json(UpdateMemberResponse {
        id: member.id,
        name: member.name,
    }))
}
