use campus_domain::pagination::{PageQuery, Paginated};

use crate::domain::repository::AccountStore;
use crate::domain::types::AccountRecord;
use crate::error::AccountsServiceError;

// ── ListAccounts ─────────────────────────────────────────────────────────────

/// Paginated, searchable listing over the account aggregate.
pub struct ListAccountsUseCase<S: AccountStore> {
    pub store: S,
}

impl<S: AccountStore> ListAccountsUseCase<S> {
    /// The search filter runs over the full ordered listing before the
    /// page is cut, so `total_count` reflects the filtered set.
    pub async fn execute(
        &self,
        search: Option<&str>,
        page: PageQuery,
    ) -> Result<Paginated<AccountRecord>, AccountsServiceError> {
        let records = self.store.list_accounts().await?;
        let filtered: Vec<AccountRecord> = match search.map(str::trim) {
            Some(query) if !query.is_empty() => records
                .into_iter()
                .filter(|record| record.matches_search(query))
                .collect(),
            _ => records,
        };
        Ok(Paginated::compute(filtered, page))
    }
}
