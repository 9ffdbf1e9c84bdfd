use std::sync::Arc;

use chrono::FixedOffset;
use sqlx::postgres::PgPoolOptions;

use shelfwatch_core::CalendarDate;
use shelfwatch_infra::{
    AppConfig, InventoryQueryEngine, LedgerMaintenance, TenantCatalog, TenantLedger,
    store::{
        AccountStore, InMemoryAccountStore, InMemoryProductStore, InMemoryRecordStore,
        PostgresAccountStore, PostgresProductStore, PostgresRecordStore, ProductStore, RecordStore,
        postgres::ensure_schema,
    },
};

pub type DynProductStore = Arc<dyn ProductStore>;
pub type DynRecordStore = Arc<dyn RecordStore>;
pub type DynAccountStore = Arc<dyn AccountStore>;

const MAX_DB_CONNECTIONS: u32 = 10;

/// Everything the handlers need, shared across requests.
pub struct AppServices {
    engine: InventoryQueryEngine<DynProductStore, DynRecordStore>,
    maintenance: LedgerMaintenance<DynProductStore, DynRecordStore, DynAccountStore>,
    utc_offset: FixedOffset,
    retention_days: u32,
}

impl AppServices {
    /// The three stores must share one backend.
    pub fn new(
        products: DynProductStore,
        records: DynRecordStore,
        accounts: DynAccountStore,
        config: &AppConfig,
    ) -> Self {
        let ledger = TenantLedger::new(TenantCatalog::new(products), records);
        Self {
            engine: InventoryQueryEngine::new(ledger.clone()),
            maintenance: LedgerMaintenance::new(ledger, accounts),
            utc_offset: config.utc_offset,
            retention_days: config.retention_days,
        }
    }

    pub fn in_memory(config: &AppConfig) -> Self {
        let products = Arc::new(InMemoryProductStore::new());
        let records = Arc::new(InMemoryRecordStore::new());
        Self::new(
            products.clone(),
            records.clone(),
            Arc::new(InMemoryAccountStore::new(products, records)),
            config,
        )
    }

    pub fn catalog(&self) -> &TenantCatalog<DynProductStore> {
        self.engine.ledger().catalog()
    }

    pub fn ledger(&self) -> &TenantLedger<DynProductStore, DynRecordStore> {
        self.engine.ledger()
    }

    pub fn engine(&self) -> &InventoryQueryEngine<DynProductStore, DynRecordStore> {
        &self.engine
    }

    pub fn maintenance(&self) -> &LedgerMaintenance<DynProductStore, DynRecordStore, DynAccountStore> {
        &self.maintenance
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// The calendar day a request is evaluated against: the client's pinned
    /// day if it sent one, otherwise the server's day at the configured offset.
    pub fn today(&self, pinned: Option<CalendarDate>) -> CalendarDate {
        pinned.unwrap_or_else(|| CalendarDate::today_in(self.utc_offset))
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url)
                .await?;
            ensure_schema(&pool).await?;
            tracing::info!("using postgres stores");

            Ok(AppServices::new(
                Arc::new(PostgresProductStore::new(pool.clone())),
                Arc::new(PostgresRecordStore::new(pool.clone())),
                Arc::new(PostgresAccountStore::new(pool)),
                config,
            ))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory stores");
            Ok(AppServices::in_memory(config))
        }
    }
}
