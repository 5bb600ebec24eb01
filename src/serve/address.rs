use axum::{extract::State, Json};
use serde::Deserialize;

use crate::lookup::AddressView;

use super::{ApiResponse, AppState, JsonBody};

#[derive(Deserialize)]
pub struct AddressRequest {
    address: String,
}

pub async fn address_info(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AddressRequest>,
) -> ApiResponse<AddressView> {
    state
        .lookup
        .perform_lookup(&request.address)
        .await
        .map(Json)
}
