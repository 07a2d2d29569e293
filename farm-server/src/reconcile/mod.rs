//! Inventory reconciliation for completed orders
//!
//! When an order completes, its line items are reconciled against the
//! catalog: oyster-category quantities are added to the harvest counter,
//! and every purchased item decrements its product's tracked stock,
//! floored at zero. Each order id is reconciled at most once.
//!
//! Reconciliation is all-or-nothing: the order claim, the harvest
//! increment and the stock decrements commit together. A store error
//! rolls back everything, claim included, so the caller can retry the
//! same order id and the work completes on the retry.

use async_trait::async_trait;
use shared::models::{ItemOutcome, ItemStatus, OrderLineItem, ReconciliationResult};
use sqlx::PgPool;

use crate::db::{self, BoxError, products::Decrement};

/// Category whose quantities feed the harvest counter
pub const OYSTER_CATEGORY: &str = "oysters";

/// Storage seam for the reconciler, so the reconciliation rules can be
/// exercised without a database. Each call to [`InventoryStore::begin`]
/// opens one unit of work.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    type Tx: InventoryTx;

    async fn begin(&self) -> Result<Self::Tx, BoxError>;
}

/// One reconciliation attempt. Dropping a transaction without calling
/// `commit` discards every staged change, including the order claim.
#[async_trait]
pub trait InventoryTx: Send {
    /// Claim an order id; `false` means it was already reconciled.
    async fn claim_order(&mut self, order_id: &str, now: i64) -> Result<bool, BoxError>;

    /// Decrement a product's stock by name (case-insensitive), floored
    /// at zero. `None` when no product matches.
    async fn decrement(
        &mut self,
        name: &str,
        quantity: i64,
        now: i64,
    ) -> Result<Option<Decrement>, BoxError>;

    /// Add to the harvest counter and record the amount on the order's
    /// ledger row.
    async fn add_harvest(&mut self, order_id: &str, quantity: i64) -> Result<(), BoxError>;

    /// Make the staged changes durable.
    async fn commit(self) -> Result<(), BoxError>;
}

/// Postgres-backed store used by the live server
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgInventoryTx {
    tx: sqlx::Transaction<'static, sqlx::Postgres>,
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    type Tx = PgInventoryTx;

    async fn begin(&self) -> Result<PgInventoryTx, BoxError> {
        Ok(PgInventoryTx {
            tx: self.pool.begin().await?,
        })
    }
}

#[async_trait]
impl InventoryTx for PgInventoryTx {
    async fn claim_order(&mut self, order_id: &str, now: i64) -> Result<bool, BoxError> {
        Ok(db::orders::claim(&mut self.tx, order_id, now).await?)
    }

    async fn decrement(
        &mut self,
        name: &str,
        quantity: i64,
        now: i64,
    ) -> Result<Option<Decrement>, BoxError> {
        db::products::decrement_inventory(&mut self.tx, name, quantity, now).await
    }

    async fn add_harvest(&mut self, order_id: &str, quantity: i64) -> Result<(), BoxError> {
        db::harvest::increment(&mut self.tx, quantity).await?;
        db::orders::record_harvest(&mut self.tx, order_id, quantity).await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), BoxError> {
        Ok(self.tx.commit().await?)
    }
}

/// Reconcile one completed order.
///
/// A replayed order id performs no mutations and reports `replayed`.
/// Items with non-positive quantities are skipped, and a missing product
/// is recorded per item without stopping the rest. A store error aborts
/// the whole attempt with nothing persisted; the caller decides whether
/// to retry.
pub async fn apply_order<S: InventoryStore>(
    store: &S,
    order_id: &str,
    items: &[OrderLineItem],
    now: i64,
) -> Result<ReconciliationResult, BoxError> {
    let mut tx = store.begin().await?;

    if !tx.claim_order(order_id, now).await? {
        tracing::info!(order_id, "Order already reconciled, skipping");
        return Ok(ReconciliationResult::replay(order_id));
    }

    let oyster_qty: i64 = items
        .iter()
        .filter(|item| item.quantity > 0 && is_oyster(item))
        .map(|item| item.quantity)
        .sum();

    let mut harvested = 0;
    if oyster_qty > 0 {
        tx.add_harvest(order_id, oyster_qty).await?;
        harvested = oyster_qty;
    }

    let mut outcomes = Vec::new();
    for item in items.iter().filter(|item| item.quantity > 0) {
        match tx.decrement(&item.name, item.quantity, now).await? {
            Some(dec) => {
                let applied = dec.applied();
                let status = if applied == item.quantity {
                    ItemStatus::Applied
                } else {
                    ItemStatus::Clamped
                };
                outcomes.push(ItemOutcome {
                    name: item.name.clone(),
                    requested: item.quantity,
                    applied,
                    status,
                });
            }
            None => {
                tracing::warn!(order_id, name = %item.name, "No matching product for line item");
                outcomes.push(ItemOutcome {
                    name: item.name.clone(),
                    requested: item.quantity,
                    applied: 0,
                    status: ItemStatus::NotFound,
                });
            }
        }
    }

    tx.commit().await?;

    if harvested > 0 {
        tracing::info!(order_id, quantity = harvested, "Harvest counter incremented");
    }

    Ok(ReconciliationResult {
        order_id: order_id.to_string(),
        replayed: false,
        harvested,
        items: outcomes,
    })
}

fn is_oyster(item: &OrderLineItem) -> bool {
    item.category
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case(OYSTER_CATEGORY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::{Mutex, OwnedMutexGuard};

    #[derive(Clone, Default)]
    struct Inner {
        products: HashMap<String, i64>,
        claimed: HashSet<String>,
        harvest: i64,
    }

    /// In-memory store double with the same guarantees as the SQL-backed
    /// one: a transaction holds the store lock end to end, and dropping
    /// it without commit restores the pre-transaction state.
    #[derive(Clone, Default)]
    struct MemoryStore {
        inner: Arc<Mutex<Inner>>,
        fail_decrements: Arc<AtomicBool>,
    }

    struct MemoryTx {
        guard: OwnedMutexGuard<Inner>,
        snapshot: Option<Inner>,
        fail_decrements: Arc<AtomicBool>,
    }

    impl Drop for MemoryTx {
        fn drop(&mut self) {
            if let Some(snapshot) = self.snapshot.take() {
                *self.guard = snapshot;
            }
        }
    }

    impl MemoryStore {
        fn with_products(entries: &[(&str, i64)]) -> Self {
            let store = Self::default();
            {
                let mut inner = store.inner.try_lock().unwrap();
                for (name, count) in entries {
                    inner.products.insert(name.to_lowercase(), *count);
                }
            }
            store
        }

        async fn stock(&self, name: &str) -> Option<i64> {
            self.inner.lock().await.products.get(&name.to_lowercase()).copied()
        }

        async fn harvest_total(&self) -> i64 {
            self.inner.lock().await.harvest
        }

        async fn is_claimed(&self, order_id: &str) -> bool {
            self.inner.lock().await.claimed.contains(order_id)
        }
    }

    #[async_trait]
    impl InventoryStore for MemoryStore {
        type Tx = MemoryTx;

        async fn begin(&self) -> Result<MemoryTx, BoxError> {
            let guard = self.inner.clone().lock_owned().await;
            let snapshot = Some(guard.clone());
            Ok(MemoryTx {
                guard,
                snapshot,
                fail_decrements: self.fail_decrements.clone(),
            })
        }
    }

    #[async_trait]
    impl InventoryTx for MemoryTx {
        async fn claim_order(&mut self, order_id: &str, _now: i64) -> Result<bool, BoxError> {
            Ok(self.guard.claimed.insert(order_id.to_string()))
        }

        async fn decrement(
            &mut self,
            name: &str,
            quantity: i64,
            _now: i64,
        ) -> Result<Option<Decrement>, BoxError> {
            if self.fail_decrements.load(Ordering::SeqCst) {
                return Err("store unavailable".into());
            }
            let Some(count) = self.guard.products.get_mut(&name.to_lowercase()) else {
                return Ok(None);
            };
            let before = *count;
            let after = (before - quantity).max(0);
            *count = after;
            Ok(Some(Decrement { before, after }))
        }

        async fn add_harvest(&mut self, _order_id: &str, quantity: i64) -> Result<(), BoxError> {
            self.guard.harvest += quantity;
            Ok(())
        }

        async fn commit(mut self) -> Result<(), BoxError> {
            self.snapshot = None;
            Ok(())
        }
    }

    fn item(name: &str, quantity: i64, category: Option<&str>) -> OrderLineItem {
        OrderLineItem {
            name: name.to_string(),
            quantity,
            category: category.map(String::from),
            price: None,
        }
    }

    #[tokio::test]
    async fn test_oyster_order_harvests_and_decrements() {
        let store = MemoryStore::with_products(&[("farm oysters", 10), ("hat", 4)]);

        let items = vec![item("Farm Oysters", 3, Some("oysters"))];
        let result = apply_order(&store, "order-1", &items, 0).await.unwrap();

        assert!(!result.replayed);
        assert_eq!(result.harvested, 3);
        assert_eq!(store.harvest_total().await, 3);
        assert_eq!(store.stock("Farm Oysters").await, Some(7));
        assert_eq!(store.stock("Hat").await, Some(4));
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].status, ItemStatus::Applied);
        assert_eq!(result.items[0].applied, 3);
    }

    #[tokio::test]
    async fn test_mixed_order_harvests_oysters_only_decrements_both() {
        let store = MemoryStore::with_products(&[("farm oysters", 10), ("hat", 4)]);

        let items = vec![
            item("Farm Oysters", 3, Some("oysters")),
            item("Hat", 1, Some("merch")),
        ];
        let result = apply_order(&store, "order-2", &items, 0).await.unwrap();

        // Only the oyster quantity feeds the counter, but both products
        // lose stock
        assert_eq!(result.harvested, 3);
        assert_eq!(store.harvest_total().await, 3);
        assert_eq!(store.stock("Farm Oysters").await, Some(7));
        assert_eq!(store.stock("Hat").await, Some(3));
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].status, ItemStatus::Applied);
        assert_eq!(result.items[1].status, ItemStatus::Applied);
    }

    #[tokio::test]
    async fn test_non_oyster_items_decrement_without_harvest() {
        let store = MemoryStore::with_products(&[("hat", 4)]);

        let items = vec![item("Hat", 2, Some("merch"))];
        let result = apply_order(&store, "order-3", &items, 0).await.unwrap();

        assert_eq!(result.harvested, 0);
        assert_eq!(store.harvest_total().await, 0);
        assert_eq!(store.stock("Hat").await, Some(2));
    }

    #[tokio::test]
    async fn test_category_match_is_case_insensitive() {
        let store = MemoryStore::with_products(&[("kumamoto", 6)]);

        let items = vec![item("Kumamoto", 2, Some("OYSTERS"))];
        let result = apply_order(&store, "order-4", &items, 0).await.unwrap();

        assert_eq!(result.harvested, 2);
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let store = MemoryStore::with_products(&[("farm oysters", 2)]);

        let items = vec![item("Farm Oysters", 5, Some("oysters"))];
        let result = apply_order(&store, "order-5", &items, 0).await.unwrap();

        assert_eq!(store.stock("Farm Oysters").await, Some(0));
        assert_eq!(result.items[0].status, ItemStatus::Clamped);
        assert_eq!(result.items[0].applied, 2);
        // The harvest counter records what was sold, not what was in stock
        assert_eq!(result.harvested, 5);
    }

    #[tokio::test]
    async fn test_unknown_product_does_not_stop_the_rest() {
        let store = MemoryStore::with_products(&[("hat", 4)]);

        let items = vec![
            item("Ghost Product", 1, None),
            item("Hat", 1, None),
        ];
        let result = apply_order(&store, "order-6", &items, 0).await.unwrap();

        assert_eq!(result.items[0].status, ItemStatus::NotFound);
        assert_eq!(result.items[1].status, ItemStatus::Applied);
        assert_eq!(store.stock("Hat").await, Some(3));
    }

    #[tokio::test]
    async fn test_non_positive_quantities_are_skipped() {
        let store = MemoryStore::with_products(&[("farm oysters", 10)]);

        let items = vec![
            item("Farm Oysters", 0, Some("oysters")),
            item("Farm Oysters", -3, Some("oysters")),
        ];
        let result = apply_order(&store, "order-7", &items, 0).await.unwrap();

        assert_eq!(result.harvested, 0);
        assert!(result.items.is_empty());
        assert_eq!(store.stock("Farm Oysters").await, Some(10));
    }

    #[tokio::test]
    async fn test_replayed_order_mutates_nothing() {
        let store = MemoryStore::with_products(&[("farm oysters", 10)]);
        let items = vec![item("Farm Oysters", 3, Some("oysters"))];

        let first = apply_order(&store, "order-8", &items, 0).await.unwrap();
        assert!(!first.replayed);

        let second = apply_order(&store, "order-8", &items, 0).await.unwrap();
        assert!(second.replayed);
        assert_eq!(second.harvested, 0);
        assert!(second.items.is_empty());
        assert_eq!(store.harvest_total().await, 3);
        assert_eq!(store.stock("Farm Oysters").await, Some(7));
    }

    #[tokio::test]
    async fn test_failed_attempt_leaves_no_trace_and_can_be_retried() {
        let store = MemoryStore::with_products(&[("farm oysters", 10), ("hat", 4)]);
        let items = vec![
            item("Farm Oysters", 3, Some("oysters")),
            item("Hat", 1, Some("merch")),
        ];

        // Store error mid-order: nothing persists, not even the claim
        store.fail_decrements.store(true, Ordering::SeqCst);
        assert!(apply_order(&store, "order-9", &items, 0).await.is_err());
        assert!(!store.is_claimed("order-9").await);
        assert_eq!(store.harvest_total().await, 0);
        assert_eq!(store.stock("Farm Oysters").await, Some(10));
        assert_eq!(store.stock("Hat").await, Some(4));

        // After recovery the same order id reconciles in full
        store.fail_decrements.store(false, Ordering::SeqCst);
        let result = apply_order(&store, "order-9", &items, 0).await.unwrap();
        assert!(!result.replayed);
        assert_eq!(result.harvested, 3);
        assert_eq!(store.stock("Farm Oysters").await, Some(7));
        assert_eq!(store.stock("Hat").await, Some(3));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_orders_never_drive_stock_negative() {
        const N: i64 = 8;
        let store = Arc::new(MemoryStore::with_products(&[("farm oysters", N - 1)]));

        let mut handles = Vec::new();
        for i in 0..N {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let items = vec![item("Farm Oysters", 1, Some("oysters"))];
                apply_order(store.as_ref(), &format!("order-c{i}"), &items, 0)
                    .await
                    .unwrap()
            }));
        }

        let mut applied_total = 0;
        let mut clamped = 0;
        for handle in handles {
            let result = handle.await.unwrap();
            applied_total += result.items[0].applied;
            if result.items[0].status == ItemStatus::Clamped {
                clamped += 1;
            }
        }

        assert_eq!(store.stock("Farm Oysters").await, Some(0));
        assert_eq!(applied_total, N - 1);
        assert_eq!(clamped, 1);
    }
}
