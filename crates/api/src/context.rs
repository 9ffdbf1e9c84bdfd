use shelfwatch_core::AccountId;

/// Account context for a request.
///
/// Inserted by the auth middleware and immutable afterwards. Every catalog and
/// ledger call takes its account from here, never from the request body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account_id: AccountId,
}

impl AccountContext {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}
