//! The account manager page and the route handlers for its actions.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    account::{
        core::{Account, AccountForm, AccountId},
        screen::AccountsScreen,
    },
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_LINK_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE,
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base,
    },
    navigation::NavBar,
    screen::{ScreenHandle, ScreenId, ScreenRegistry},
    store::Store,
};

/// The state needed by the account manager route handlers.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    pub store: Store,
    pub screens: Arc<ScreenRegistry<AccountsScreen>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            screens: state.account_screens.clone(),
        }
    }
}

const SCREEN_CONTAINER_ID: &str = "accounts-screen";

fn accounts_page_view(screen_id: ScreenId, screen: &AccountsScreen) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (accounts_screen_view(screen_id, screen))
        }
    );

    base("Accounts", &content)
}

/// Renders the part of the page that actions re-render and swap in.
fn accounts_screen_view(screen_id: ScreenId, screen: &AccountsScreen) -> Markup {
    let form_url = format_endpoint(endpoints::ACCOUNT_FORM, &[&screen_id]);

    html!(
        div
            id=(SCREEN_CONTAINER_ID)
            class="w-full lg:max-w-5xl space-y-4"
            hx-target="this"
            hx-swap="outerHTML"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Accounts" }

                button type="button" hx-post=(form_url) class=(BUTTON_SECONDARY_STYLE)
                {
                    "Add Account"
                }
            }

            section class="w-full overflow-x-auto dark:bg-gray-800"
            {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for account in screen.accounts() {
                            (account_row_view(screen_id, account))
                        }

                        @if screen.accounts().is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No accounts found."
                                }
                            }
                        }
                    }
                }
            }

            @if screen.form().is_visible() {
                (account_form_view(
                    screen_id,
                    screen.form().fields(),
                    screen.form().editing().is_some(),
                ))
            }
        }
    )
}

fn account_row_view(screen_id: ScreenId, account: &Account) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_ACCOUNT, &[&screen_id, &account.id]);
    let delete_url = format_endpoint(endpoints::DELETE_ACCOUNT, &[&screen_id, &account.id]);

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (account.name)
            }

            td class=(TABLE_CELL_STYLE)
            {
                (account.description.as_deref().unwrap_or_default())
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    button type="button" hx-post=(edit_url) class=(BUTTON_LINK_STYLE)
                    {
                        "Edit"
                    }

                    button type="button" class=(BUTTON_LINK_STYLE)
                    {
                        "Add Transaction"
                    }

                    button type="button" hx-delete=(delete_url) class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    )
}

fn account_form_view(screen_id: ScreenId, fields: &AccountForm, is_editing: bool) -> Markup {
    let submit_url = format_endpoint(endpoints::SUBMIT_ACCOUNT, &[&screen_id]);
    let heading = if is_editing {
        "Edit Account"
    } else {
        "Add New Account"
    };

    html!(
        form hx-post=(submit_url) class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-bold" { (heading) }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    type="text"
                    name="name"
                    id="name"
                    required
                    autofocus
                    value=(fields.name)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                textarea
                    name="description"
                    id="description"
                    rows="3"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (fields.description)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Account" }
        }
    )
}

fn get_screen(
    screens: &ScreenRegistry<AccountsScreen>,
    screen_id: ScreenId,
) -> Result<ScreenHandle<AccountsScreen>, Error> {
    screens.get(screen_id).ok_or_else(|| {
        tracing::debug!("Account screen {screen_id} is not mounted");
        Error::ScreenExpired(endpoints::ACCOUNTS_VIEW)
    })
}

/// Mounts a new account manager screen, loads its accounts and renders the page.
pub async fn get_accounts_page(State(state): State<AccountsPageState>) -> Response {
    let mut screen = AccountsScreen::default();
    // A failed load is logged by the screen and renders an empty list.
    let _ = screen.load_accounts(&state.store).await;

    let (screen_id, handle) = state.screens.mount(screen);
    let screen = handle.lock().await;

    accounts_page_view(screen_id, &screen).into_response()
}

/// Shows or hides the "Add Account" form.
pub async fn toggle_account_form(
    State(state): State<AccountsPageState>,
    Path(screen_id): Path<ScreenId>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    screen.toggle_add_form();

    Ok(accounts_screen_view(screen_id, &screen))
}

/// Opens the form pre-populated with an account's fields.
pub async fn edit_account(
    State(state): State<AccountsPageState>,
    Path((screen_id, account_id)): Path<(ScreenId, AccountId)>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    screen.open_edit_form(account_id);

    Ok(accounts_screen_view(screen_id, &screen))
}

/// Creates or updates an account from the submitted form.
pub async fn submit_account_form(
    State(state): State<AccountsPageState>,
    Path(screen_id): Path<ScreenId>,
    Form(form): Form<AccountForm>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    // Failures are logged by the screen and leave its list as it was.
    let _ = screen.submit_form(&state.store, form).await;

    Ok(accounts_screen_view(screen_id, &screen))
}

/// Deletes an account.
pub async fn delete_account(
    State(state): State<AccountsPageState>,
    Path((screen_id, account_id)): Path<(ScreenId, AccountId)>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    let _ = screen.delete_account(&state.store, account_id).await;

    Ok(accounts_screen_view(screen_id, &screen))
}
