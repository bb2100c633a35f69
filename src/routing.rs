//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{
        delete_account, edit_account, get_accounts_page, submit_account_form, toggle_account_form,
    },
    endpoints,
    not_found::get_404_not_found,
    transaction::{
        delete_transaction, edit_transaction, get_transactions_page, submit_transaction_form,
        toggle_transaction_form,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::ACCOUNT_FORM, post(toggle_account_form))
        .route(endpoints::EDIT_ACCOUNT, post(edit_account))
        .route(endpoints::SUBMIT_ACCOUNT, post(submit_account_form))
        .route(endpoints::DELETE_ACCOUNT, delete(delete_account));

    let transaction_routes = Router::new()
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::TRANSACTION_FORM, post(toggle_transaction_form))
        .route(endpoints::EDIT_TRANSACTION, post(edit_transaction))
        .route(endpoints::SUBMIT_TRANSACTION, post(submit_transaction_form))
        .route(endpoints::DELETE_TRANSACTION, delete(delete_transaction));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .merge(account_routes)
        .merge(transaction_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the account manager.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::ACCOUNTS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_accounts() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::ACCOUNTS_VIEW);
    }
}
