use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};

use crate::auth::{authorize, Operation, Principal};
use crate::error::{ApiError, ValidationErrors};
use crate::models::booking_model::{Ticket, TicketInput};
use crate::storage::{DynStore, NewTicket, StoreError};

pub async fn load_tickets(
    principal: Principal,
    Extension(store): Extension<DynStore>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    authorize(&principal, Operation::List)?;
    Ok(Json(store.list_tickets().await?))
}

pub async fn load_ticket(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<Json<Ticket>, ApiError> {
    authorize(&principal, Operation::Retrieve)?;
    Ok(Json(store.get_ticket(id).await?))
}

/// Books a seat. The seat position is range-checked against the hall the
/// session runs in; the uniqueness of `(session, row, seat)` is enforced by
/// the store and surfaces as a 409.
pub async fn add_ticket(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Json(input): Json<TicketInput>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    authorize(&principal, Operation::Create)?;
    let mut errors = ValidationErrors::new();

    match store.get_session(input.movie_session_id).await {
        Ok(session) => {
            let hall = store.get_hall(session.cinema_hall_id).await?;
            errors = input.validate_for_hall(&hall);
        }
        Err(StoreError::NotFound { .. }) => {
            errors.push(
                "movie_session_id",
                format!("unknown movie session id {}", input.movie_session_id),
            );
        }
        Err(err) => return Err(err.into()),
    }
    errors.into_result()?;

    let ticket = store
        .insert_ticket(NewTicket {
            movie_session_id: input.movie_session_id,
            row: input.row,
            seat: input.seat,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn delete_ticket(
    principal: Principal,
    Extension(store): Extension<DynStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&principal, Operation::Delete)?;
    store.delete_ticket(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
