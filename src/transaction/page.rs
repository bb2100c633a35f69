//! The transaction manager page and the route handlers for its actions.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_LINK_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE,
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, TABLE_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    screen::{ScreenHandle, ScreenId, ScreenRegistry},
    store::Store,
    transaction::{
        core::{AccountOption, Transaction, TransactionId},
        form::TransactionForm,
        screen::TransactionsScreen,
    },
};

/// The state needed by the transaction manager route handlers.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub store: Store,
    pub screens: Arc<ScreenRegistry<TransactionsScreen>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            screens: state.transaction_screens.clone(),
        }
    }
}

const SCREEN_CONTAINER_ID: &str = "transactions-screen";

fn transactions_page_view(screen_id: ScreenId, screen: &TransactionsScreen) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            (transactions_screen_view(screen_id, screen))
        }
    );

    base("Transactions", &content)
}

fn transactions_screen_view(screen_id: ScreenId, screen: &TransactionsScreen) -> Markup {
    let form_url = format_endpoint(endpoints::TRANSACTION_FORM, &[&screen_id]);

    html!(
        div
            id=(SCREEN_CONTAINER_ID)
            class="w-full lg:max-w-5xl space-y-4"
            hx-target="this"
            hx-swap="outerHTML"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                button type="button" hx-post=(form_url) class=(BUTTON_SECONDARY_STYLE)
                {
                    "Add Transaction"
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
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for transaction in screen.transactions() {
                            (transaction_row_view(screen_id, transaction))
                        }

                        @if screen.transactions().is_empty() {
                            tr
                            {
                                td
                                    colspan="4"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No transactions found."
                                }
                            }
                        }
                    }
                }
            }

            @if screen.form().is_visible() {
                (transaction_form_view(
                    screen_id,
                    screen.form().fields(),
                    screen.accounts(),
                    screen.form().editing().is_some(),
                ))
            }
        }
    )
}

fn transaction_row_view(screen_id: ScreenId, transaction: &Transaction) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION, &[&screen_id, &transaction.id]);
    let delete_url = format_endpoint(
        endpoints::DELETE_TRANSACTION,
        &[&screen_id, &transaction.id],
    );

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class="px-6 py-4 text-right tabular-nums"
            {
                (format_currency(transaction.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description)
            }

            td class=(TABLE_CELL_STYLE)
            {
                (transaction.account_name().unwrap_or_default())
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    button type="button" hx-post=(edit_url) class=(BUTTON_LINK_STYLE)
                    {
                        "Edit"
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

fn transaction_form_view(
    screen_id: ScreenId,
    fields: &TransactionForm,
    accounts: &[AccountOption],
    is_editing: bool,
) -> Markup {
    let submit_url = format_endpoint(endpoints::SUBMIT_TRANSACTION, &[&screen_id]);
    let heading = if is_editing {
        "Edit Transaction"
    } else {
        "Add New Transaction"
    };

    html!(
        form hx-post=(submit_url) class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-bold" { (heading) }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    required
                    autofocus
                    value=(fields.amount)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    required
                    value=(fields.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="accountid" class=(FORM_LABEL_STYLE) { "Account" }

                select
                    name="accountid"
                    id="accountid"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[fields.accountid.is_empty()] { "Select an account" }

                    @for account in accounts {
                        @let value = account.id.to_string();
                        option value=(value) selected[value == fields.accountid] {
                            (account.name)
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Transaction" }
        }
    )
}

fn get_screen(
    screens: &ScreenRegistry<TransactionsScreen>,
    screen_id: ScreenId,
) -> Result<ScreenHandle<TransactionsScreen>, Error> {
    screens.get(screen_id).ok_or_else(|| {
        tracing::debug!("Transaction screen {screen_id} is not mounted");
        Error::ScreenExpired(endpoints::TRANSACTIONS_VIEW)
    })
}

/// Mounts a new transaction manager screen, loads its transactions and
/// account options, and renders the page.
pub async fn get_transactions_page(State(state): State<TransactionsPageState>) -> Response {
    let mut screen = TransactionsScreen::default();
    // A failed load is logged by the screen and renders empty lists.
    let _ = screen.load_transactions_and_accounts(&state.store).await;

    let (screen_id, handle) = state.screens.mount(screen);
    let screen = handle.lock().await;

    transactions_page_view(screen_id, &screen).into_response()
}

/// Shows or hides the "Add Transaction" form.
pub async fn toggle_transaction_form(
    State(state): State<TransactionsPageState>,
    Path(screen_id): Path<ScreenId>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    screen.toggle_add_form();

    Ok(transactions_screen_view(screen_id, &screen))
}

/// Opens the form pre-populated with a transaction's fields.
pub async fn edit_transaction(
    State(state): State<TransactionsPageState>,
    Path((screen_id, transaction_id)): Path<(ScreenId, TransactionId)>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    screen.open_edit_form(transaction_id);

    Ok(transactions_screen_view(screen_id, &screen))
}

/// Creates or updates a transaction from the submitted form.
pub async fn submit_transaction_form(
    State(state): State<TransactionsPageState>,
    Path(screen_id): Path<ScreenId>,
    Form(form): Form<TransactionForm>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    // Failures are logged by the screen and leave its list as it was.
    let _ = screen.submit_form(&state.store, form).await;

    Ok(transactions_screen_view(screen_id, &screen))
}

/// Deletes a transaction.
pub async fn delete_transaction(
    State(state): State<TransactionsPageState>,
    Path((screen_id, transaction_id)): Path<(ScreenId, TransactionId)>,
) -> Result<Markup, Error> {
    let handle = get_screen(&state.screens, screen_id)?;
    let mut screen = handle.lock().await;

    let _ = screen.delete_transaction(&state.store, transaction_id).await;

    Ok(transactions_screen_view(screen_id, &screen))
}

#[cfg(test)]
mod transactions_view_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use scraper::{ElementRef, Html, Selector};

    use crate::{
        db::initialize,
        screen::ScreenId,
        store::Store,
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_valid_html, must_get_form,
        },
        transaction::screen::TransactionsScreen,
    };

    use super::{transactions_page_view, transactions_screen_view};

    fn screen_id() -> ScreenId {
        serde_json::from_str("4").unwrap()
    }

    fn text_of(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().trim().to_owned()
    }

    async fn loaded_screen(seed_sql: &str) -> TransactionsScreen {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection.execute_batch(seed_sql).unwrap();
        let store = Store::new(Arc::new(Mutex::new(connection)));

        let mut screen = TransactionsScreen::default();
        screen
            .load_transactions_and_accounts(&store)
            .await
            .unwrap();
        screen
    }

    #[track_caller]
    fn must_get_cells(html: &Html, want_row_count: usize) -> Vec<Vec<String>> {
        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            rows.len(),
            want_row_count,
            "want {want_row_count} table rows, got {}",
            rows.len()
        );

        let cell = Selector::parse("td").unwrap();
        rows.into_iter()
            .map(|row| row.select(&cell).map(text_of).collect())
            .collect()
    }

    #[test]
    fn page_has_table_header_and_add_button() {
        let rendered =
            transactions_page_view(screen_id(), &TransactionsScreen::default()).into_string();

        let html = Html::parse_document(&rendered);
        assert_valid_html(&html);
        let headers = html
            .select(&Selector::parse("thead th").unwrap())
            .map(text_of)
            .collect::<Vec<_>>();
        assert_eq!(headers, ["Amount", "Description", "Account", "Actions"]);
        let add_button = html
            .select(&Selector::parse("header button").unwrap())
            .next()
            .expect("Could not find the add button");
        assert_eq!(text_of(add_button), "Add Transaction");
        assert_hx_endpoint(&add_button, "/transactions/screens/4/form", "hx-post");
    }

    #[tokio::test]
    async fn renders_account_name_and_formatted_amount() {
        let screen = loaded_screen(
            "INSERT INTO accounts (id, name) VALUES (1, 'Checking');
             INSERT INTO transactions (id, amount, description, accountid)
                VALUES (5, 12.5, 'Lunch', 1);",
        )
        .await;

        let rendered = transactions_screen_view(screen_id(), &screen).into_string();

        let html = Html::parse_fragment(&rendered);
        assert_valid_html(&html);
        let cells = must_get_cells(&html, 1);
        assert_eq!(cells[0][..3], ["$12.50", "Lunch", "Checking"]);
        let buttons = html
            .select(&Selector::parse("tbody button").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(buttons.len(), 2);
        assert_hx_endpoint(
            &buttons[0],
            "/transactions/screens/4/transactions/5/edit",
            "hx-post",
        );
        assert_hx_endpoint(
            &buttons[1],
            "/transactions/screens/4/transactions/5",
            "hx-delete",
        );
    }

    #[test]
    fn shows_placeholder_for_empty_list() {
        let rendered =
            transactions_screen_view(screen_id(), &TransactionsScreen::default()).into_string();

        let html = Html::parse_fragment(&rendered);
        assert_valid_html(&html);
        let cells = must_get_cells(&html, 1);
        assert_eq!(cells[0], ["No transactions found."]);
    }

    #[tokio::test]
    async fn add_form_lists_accounts_with_placeholder() {
        let mut screen = loaded_screen(
            "INSERT INTO accounts (name) VALUES ('Checking');
             INSERT INTO accounts (name) VALUES ('Savings');",
        )
        .await;
        screen.toggle_add_form();

        let rendered = transactions_screen_view(screen_id(), &screen).into_string();

        let html = Html::parse_fragment(&rendered);
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/transactions/screens/4/submit", "hx-post");
        assert_eq!(
            text_of(form.select(&Selector::parse("h2").unwrap()).next().unwrap()),
            "Add New Transaction"
        );
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "description", "text");
        let options = form
            .select(&Selector::parse("select[name=accountid][required] option").unwrap())
            .map(|option| {
                (
                    option.value().attr("value").unwrap_or_default().to_owned(),
                    text_of(option),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            options,
            [
                (String::new(), "Select an account".to_owned()),
                ("1".to_owned(), "Checking".to_owned()),
                ("2".to_owned(), "Savings".to_owned()),
            ]
        );
        assert_form_submit_button_with_text(&form, "Save Transaction");
    }

    #[tokio::test]
    async fn edit_form_is_prefilled() {
        let mut screen = loaded_screen(
            "INSERT INTO accounts (name) VALUES ('Checking');
             INSERT INTO accounts (name) VALUES ('Savings');
             INSERT INTO transactions (amount, description, accountid) VALUES (12.5, 'Lunch', 2);",
        )
        .await;
        screen.open_edit_form(1);

        let rendered = transactions_screen_view(screen_id(), &screen).into_string();

        let html = Html::parse_fragment(&rendered);
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_eq!(
            text_of(form.select(&Selector::parse("h2").unwrap()).next().unwrap()),
            "Edit Transaction"
        );
        assert_form_input_with_value(&form, "amount", "number", "12.5");
        assert_form_input_with_value(&form, "description", "text", "Lunch");
        let selected = form
            .select(&Selector::parse("option[selected]").unwrap())
            .map(text_of)
            .collect::<Vec<_>>();
        assert_eq!(selected, ["Savings"]);
    }
}
