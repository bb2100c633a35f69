//! Accounts: the named buckets that transactions belong to.

mod core;
mod page;
mod screen;

pub use core::{ACCOUNTS_TABLE, AccountId, create_account_table};
pub use page::{
    delete_account, edit_account, get_accounts_page, submit_account_form, toggle_account_form,
};
pub use screen::AccountsScreen;
