//! The view-model behind the transaction manager screen.

use crate::{
    account::ACCOUNTS_TABLE,
    form_overlay::FormOverlay,
    store::{Store, StoreError},
    transaction::{
        core::{
            ACCOUNT_OPTION_COLUMNS, AccountOption, TRANSACTION_WITH_ACCOUNT_COLUMNS,
            TRANSACTIONS_TABLE, Transaction, TransactionId,
        },
        form::TransactionForm,
    },
};

/// The transactions and account options shown on one mounted transaction
/// manager screen, and the state of its inline form.
#[derive(Debug, Default)]
pub struct TransactionsScreen {
    transactions: Vec<Transaction>,
    accounts: Vec<AccountOption>,
    form: FormOverlay<TransactionForm, TransactionId>,
}

impl TransactionsScreen {
    /// The transactions as of the last fetch, each with its account name.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The options for the account picker.
    pub fn accounts(&self) -> &[AccountOption] {
        &self.accounts
    }

    pub fn form(&self) -> &FormOverlay<TransactionForm, TransactionId> {
        &self.form
    }

    /// Handle the "Add Transaction" button.
    pub fn toggle_add_form(&mut self) {
        self.form.toggle_add();
    }

    /// Open the form pre-populated with the transaction `id`.
    ///
    /// Does nothing if `id` is not in the local list.
    pub fn open_edit_form(&mut self, id: TransactionId) {
        if let Some(transaction) = self
            .transactions
            .iter()
            .find(|transaction| transaction.id == id)
        {
            let fields = TransactionForm::from(transaction);
            self.form.open_edit(id, fields);
        }
    }

    /// Fetch the account options and the joined transaction list.
    ///
    /// Both lists are replaced together, and only if both fetches succeed.
    pub async fn load_transactions_and_accounts(
        &mut self,
        store: &Store,
    ) -> Result<(), StoreError> {
        let accounts = store
            .from(ACCOUNTS_TABLE)
            .select_as::<AccountOption>(Some(ACCOUNT_OPTION_COLUMNS))
            .await
            .inspect_err(|error| tracing::error!("Could not fetch accounts: {error}"))?;

        let transactions = fetch_transactions(store).await?;

        self.accounts = accounts;
        self.transactions = transactions;

        Ok(())
    }

    /// Submit the inline form, then close and clear it whatever the outcome.
    pub async fn submit_form(
        &mut self,
        store: &Store,
        form: TransactionForm,
    ) -> Result<(), StoreError> {
        let editing_id = self.form.finish_submission();

        self.submit_transaction(store, &form, editing_id).await
    }

    /// Create a transaction, or update the transaction `editing_id`.
    ///
    /// Either way the transaction list is fetched again so that the account
    /// names stay joined.
    pub async fn submit_transaction(
        &mut self,
        store: &Store,
        form: &TransactionForm,
        editing_id: Option<TransactionId>,
    ) -> Result<(), StoreError> {
        let write = form.to_write();

        match editing_id {
            Some(id) => store
                .from(TRANSACTIONS_TABLE)
                .update(&write)
                .eq("id", id)
                .await
                .inspect_err(|error| tracing::error!("Error updating transaction {id}: {error}"))?,
            None => store
                .from(TRANSACTIONS_TABLE)
                .insert(&[&write])
                .await
                .inspect_err(|error| {
                    tracing::error!("Error inserting transaction {write:?}: {error}")
                })?,
        }

        self.reload_transactions(store).await
    }

    /// Delete the transaction `id` and drop it from the local list.
    ///
    /// On failure the transaction stays in the list and the error is logged.
    pub async fn delete_transaction(
        &mut self,
        store: &Store,
        id: TransactionId,
    ) -> Result<(), StoreError> {
        store
            .from(TRANSACTIONS_TABLE)
            .delete()
            .eq("id", id)
            .await
            .inspect_err(|error| tracing::error!("Error deleting transaction {id}: {error}"))?;

        self.transactions.retain(|transaction| transaction.id != id);

        Ok(())
    }

    async fn reload_transactions(&mut self, store: &Store) -> Result<(), StoreError> {
        self.transactions = fetch_transactions(store).await?;

        Ok(())
    }
}

async fn fetch_transactions(store: &Store) -> Result<Vec<Transaction>, StoreError> {
    store
        .from(TRANSACTIONS_TABLE)
        .select_as(Some(TRANSACTION_WITH_ACCOUNT_COLUMNS))
        .await
        .inspect_err(|error| tracing::error!("Could not fetch transactions: {error}"))
}
