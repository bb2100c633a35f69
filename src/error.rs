//! Defines the app level error type and its conversion to rendered HTML pages.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
///
/// Store failures inside a screen are logged where they happen and never
/// reach this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An action named a screen that was never mounted or has been evicted.
    ///
    /// Holds the page the client should load to mount a new screen.
    #[error("the screen is no longer mounted, reload {0}")]
    ScreenExpired(&'static str),

    /// The database could not be set up.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(#[from] rusqlite::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::ScreenExpired(page) => {
                tracing::debug!("Redirecting request for an expired screen to {page}");
                (HxRedirect(page.to_owned()), StatusCode::OK).into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        endpoints,
        test_utils::{assert_content_type, assert_hx_redirect},
    };

    use super::Error;

    #[test]
    fn not_found_renders_404_page() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_content_type(&response, "text/html; charset=utf-8");
    }

    #[test]
    fn expired_screen_redirects_to_page() {
        let response = Error::ScreenExpired(endpoints::ACCOUNTS_VIEW).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
    }

    #[test]
    fn sql_error_renders_500_page() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_content_type(&response, "text/html; charset=utf-8");
    }
}
