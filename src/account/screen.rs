//! The view-model behind the account manager screen.

use crate::{
    account::core::{ACCOUNTS_TABLE, Account, AccountForm, AccountId},
    form_overlay::FormOverlay,
    store::{Store, StoreError},
};

/// The accounts shown on one mounted account manager screen and the state of
/// its inline form.
#[derive(Debug, Default)]
pub struct AccountsScreen {
    accounts: Vec<Account>,
    form: FormOverlay<AccountForm, AccountId>,
}

impl AccountsScreen {
    /// The accounts as of the last fetch, with local edits applied.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn form(&self) -> &FormOverlay<AccountForm, AccountId> {
        &self.form
    }

    /// Handle the "Add Account" button.
    pub fn toggle_add_form(&mut self) {
        self.form.toggle_add();
    }

    /// Open the form pre-populated with the account `id`.
    ///
    /// Does nothing if `id` is not in the local list.
    pub fn open_edit_form(&mut self, id: AccountId) {
        if let Some(account) = self.accounts.iter().find(|account| account.id == id) {
            let fields = AccountForm::from(account);
            self.form.open_edit(id, fields);
        }
    }

    /// Replace the local list with every account in the store.
    ///
    /// On failure the previous list is kept and the error is logged.
    pub async fn load_accounts(&mut self, store: &Store) -> Result<(), StoreError> {
        let accounts = fetch_accounts(store)
            .await
            .inspect_err(|error| tracing::error!("Could not fetch accounts: {error}"))?;

        self.accounts = accounts;

        Ok(())
    }

    /// Submit the inline form, then close and clear it whatever the outcome.
    pub async fn submit_form(&mut self, store: &Store, form: AccountForm) -> Result<(), StoreError> {
        let editing_id = self.form.finish_submission();

        self.submit_account(store, form, editing_id).await
    }

    /// Create an account, or update the account `editing_id`.
    ///
    /// A new account is followed by a full re-fetch. An update only patches
    /// the edited entry in the local list, so changes made to other accounts
    /// elsewhere stay invisible until the next load.
    pub async fn submit_account(
        &mut self,
        store: &Store,
        form: AccountForm,
        editing_id: Option<AccountId>,
    ) -> Result<(), StoreError> {
        match editing_id {
            Some(id) => {
                store
                    .from(ACCOUNTS_TABLE)
                    .update(&form)
                    .eq("id", id)
                    .await
                    .inspect_err(|error| tracing::error!("Error updating account {id}: {error}"))?;

                if let Some(account) = self.accounts.iter_mut().find(|account| account.id == id) {
                    account.name = form.name;
                    account.description = Some(form.description);
                }

                Ok(())
            }
            None => {
                store
                    .from(ACCOUNTS_TABLE)
                    .insert(&[&form])
                    .await
                    .inspect_err(|error| {
                        tracing::error!("Error inserting account {form:?}: {error}")
                    })?;

                self.load_accounts(store).await
            }
        }
    }

    /// Delete the account `id` and drop it from the local list.
    ///
    /// On failure the account stays in the list and the error is logged.
    pub async fn delete_account(&mut self, store: &Store, id: AccountId) -> Result<(), StoreError> {
        store
            .from(ACCOUNTS_TABLE)
            .delete()
            .eq("id", id)
            .await
            .inspect_err(|error| tracing::error!("Error deleting account {id}: {error}"))?;

        self.accounts.retain(|account| account.id != id);

        Ok(())
    }
}

async fn fetch_accounts(store: &Store) -> Result<Vec<Account>, StoreError> {
    store.from(ACCOUNTS_TABLE).select_as(None).await
}
