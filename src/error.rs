use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};

use crate::io_struct::ProblemDetail;

/// Body returned for a missing or blank prompt.
pub const EMPTY_QUERY_MESSAGE: &str = "The natural language query cannot be empty.";

/// Message carried by every [`QueryError::ProcessingFailure`].
pub const PROCESSING_FAILURE_MESSAGE: &str = "An error occurred while processing your query.";

pub const QUERY_ERROR_TYPE: &str = "uri:mcpassistant:query-error";
pub const QUERY_ERROR_TITLE: &str = "Query Processing Error";

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("The natural language query cannot be empty or null.")]
    InvalidInput,

    #[error("{message}")]
    ProcessingFailure {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl QueryError {
    /// Wraps an upstream error behind the generic processing failure message.
    pub fn processing(source: impl Into<BoxError>) -> Self {
        QueryError::ProcessingFailure {
            message: PROCESSING_FAILURE_MESSAGE.to_string(),
            source: source.into(),
        }
    }

    pub fn problem_detail(&self) -> Option<ProblemDetail> {
        match self {
            QueryError::InvalidInput => None,
            QueryError::ProcessingFailure { message, .. } => Some(ProblemDetail {
                type_uri: QUERY_ERROR_TYPE.to_string(),
                title: QUERY_ERROR_TITLE.to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                detail: message.clone(),
            }),
        }
    }
}

impl ResponseError for QueryError {
    fn status_code(&self) -> StatusCode {
        match self {
            QueryError::InvalidInput => StatusCode::BAD_REQUEST,
            QueryError::ProcessingFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.problem_detail() {
            Some(problem) => HttpResponse::build(self.status_code())
                .content_type(ProblemDetail::CONTENT_TYPE)
                .json(problem),
            None => HttpResponse::build(self.status_code())
                .content_type(ContentType::plaintext())
                .body(EMPTY_QUERY_MESSAGE),
        }
    }
}
