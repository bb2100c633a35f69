//! Transactions: monetary entries that each belong to one account.

mod core;
mod form;
mod page;
mod screen;

pub use core::create_transaction_table;
pub use page::{
    delete_transaction, edit_transaction, get_transactions_page, submit_transaction_form,
    toggle_transaction_form,
};
pub use screen::TransactionsScreen;
