use axum::extract::rejection::QueryRejection;
use axum::extract::FromRequestParts;

use crate::error::TicketLensError;

/// Query-string extractor whose rejection renders as the v1 error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(TicketLensError))]
pub struct AppQuery<T>(pub T);

impl From<QueryRejection> for TicketLensError {
    fn from(rejection: QueryRejection) -> Self {
        match rejection {
            QueryRejection::FailedToDeserializeQueryString(err) => {
                TicketLensError::Validation(format!("Invalid query string: {}", err.body_text()))
            }
            _ => TicketLensError::Validation(rejection.body_text()),
        }
    }
}
