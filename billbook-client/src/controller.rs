//! Order collection controller
//!
//! Owns the local copy of the order collection and reconciles it after each
//! record store call. A failed call never partially applies: the collection
//! keeps its pre-call state. The one exception is [`delete_all`], which on
//! partial failure leaves the collection stale until the next refresh.
//!
//! [`delete_all`]: OrderCollectionController::delete_all

use futures::{StreamExt, future, stream};
use shared::order::{self, OrderAggregate, OrderStats, StatusFilter};
use tracing::{info, warn};

use crate::{RecordStore, StoreError, SyncError};

pub struct OrderCollectionController<S> {
    store: S,
    orders: Vec<OrderAggregate>,
    last_error: Option<String>,
    delete_concurrency: Option<usize>,
}

impl<S: RecordStore> OrderCollectionController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            orders: Vec::new(),
            last_error: None,
            delete_concurrency: None,
        }
    }

    /// Cap the number of deletes in flight during [`Self::delete_all`]
    pub fn with_delete_concurrency(mut self, limit: Option<usize>) -> Self {
        self.delete_concurrency = limit.filter(|n| *n > 0);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Local collection, newest first
    pub fn orders(&self) -> &[OrderAggregate] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&OrderAggregate> {
        self.orders.iter().find(|o| o.id() == Some(id))
    }

    /// Message of the last failed operation, cleared when the next one starts
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn stats(&self) -> OrderStats {
        order::aggregate_stats(&self.orders)
    }

    pub fn filtered(&self, filter: StatusFilter) -> Vec<&OrderAggregate> {
        order::filter_by_status(&self.orders, filter)
    }

    /// Replace the whole collection with the store's current contents
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        self.last_error = None;
        match self.store.list_all().await {
            Ok(mut orders) => {
                order::sort_newest_first(&mut orders);
                info!(count = orders.len(), "Order collection refreshed");
                self.orders = orders;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Fetch one order for editing. The collection is not touched.
    pub async fn load(&mut self, id: &str) -> Result<OrderAggregate, SyncError> {
        self.last_error = None;
        match self.store.get_one(id).await {
            Ok(order) => Ok(order),
            Err(e) => self.fail(e),
        }
    }

    /// Persist a new draft and add the stored record to the collection
    pub async fn create(&mut self, draft: &OrderAggregate) -> Result<OrderAggregate, SyncError> {
        self.last_error = None;
        match self.store.create(draft).await {
            Ok(created) => {
                info!(id = ?created.id(), client = %created.display_name(), "Order created");
                self.orders.push(created.clone());
                order::sort_newest_first(&mut self.orders);
                Ok(created)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Persist an edited order (whole-record replace) and swap it into the
    /// collection
    pub async fn save(&mut self, edited: &OrderAggregate) -> Result<OrderAggregate, SyncError> {
        self.last_error = None;
        let Some(id) = edited.id().map(str::to_string) else {
            return self.fail(SyncError::MissingId);
        };
        match self.store.update(&id, edited).await {
            Ok(updated) => {
                info!(%id, "Order updated");
                self.replace_local(&id, updated.clone());
                Ok(updated)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Enter a new amount paid on a stored order and persist it
    pub async fn record_payment(&mut self, id: &str, amount: f64) -> Result<OrderAggregate, SyncError> {
        self.last_error = None;
        let mut edited = match self.get(id) {
            Some(order) => order.clone(),
            None => return self.fail(SyncError::UnknownOrder(id.to_string())),
        };
        if let Err(e) = edited.set_amount_paid(Some(amount)) {
            return self.fail(e);
        }
        self.save(&edited).await
    }

    /// Mark an order fully paid. Status and amount go out in one write.
    pub async fn clear_payment(&mut self, id: &str) -> Result<OrderAggregate, SyncError> {
        self.last_error = None;
        let mut cleared = match self.get(id) {
            Some(order) => order.clone(),
            None => return self.fail(SyncError::UnknownOrder(id.to_string())),
        };
        if let Err(e) = cleared.clear_payment() {
            return self.fail(e);
        }
        match self.store.update(id, &cleared).await {
            Ok(updated) => {
                info!(%id, amount = updated.amount_paid(), "Payment cleared");
                self.replace_local(id, updated.clone());
                Ok(updated)
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn delete_one(&mut self, id: &str) -> Result<(), SyncError> {
        self.last_error = None;
        match self.store.delete(id).await {
            Ok(()) => {
                info!(%id, "Order deleted");
                self.orders.retain(|o| o.id() != Some(id));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Delete every order in the collection concurrently.
    ///
    /// All calls are awaited. Only if every one succeeded is the collection
    /// cleared; otherwise it is left exactly as it was and the caller has to
    /// [`refresh`](Self::refresh) to learn which orders survived.
    pub async fn delete_all(&mut self) -> Result<(), SyncError> {
        self.last_error = None;
        let ids: Vec<String> = self
            .orders
            .iter()
            .filter_map(|o| o.id().map(str::to_string))
            .collect();
        let total = ids.len();

        let store = &self.store;
        let deletes = ids.iter().map(|id| store.delete(id));
        let outcomes: Vec<Result<(), StoreError>> = match self.delete_concurrency {
            Some(limit) => stream::iter(deletes).buffer_unordered(limit).collect().await,
            None => future::join_all(deletes).await,
        };

        let mut failed = 0;
        for outcome in outcomes {
            if let Err(e) = outcome {
                warn!(error = %e, "Bulk delete call failed");
                failed += 1;
            }
        }

        if failed > 0 {
            return self.fail(SyncError::PartialBulkDelete { failed, total });
        }

        info!(count = total, "All orders deleted");
        self.orders.clear();
        Ok(())
    }

    fn replace_local(&mut self, id: &str, updated: OrderAggregate) {
        match self.orders.iter_mut().find(|o| o.id() == Some(id)) {
            Some(slot) => *slot = updated,
            None => {
                self.orders.push(updated);
                order::sort_newest_first(&mut self.orders);
            }
        }
    }

    fn fail<T>(&mut self, error: impl Into<SyncError>) -> Result<T, SyncError> {
        let error = error.into();
        warn!(error = %error, "Order operation failed");
        self.last_error = Some(error.to_string());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use async_trait::async_trait;
    use shared::order::{BillMode, PaymentStatus};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory record store with switchable failures
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<OrderAggregate>>,
        next_id: AtomicUsize,
        fail_list: AtomicBool,
        fail_update: AtomicBool,
        fail_delete: Mutex<HashSet<String>>,
        writes: Mutex<Vec<OrderAggregate>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MemoryStore {
        fn with_orders(orders: Vec<OrderAggregate>) -> Self {
            let store = Self::default();
            store.next_id.store(orders.len() + 1, Ordering::SeqCst);
            *store.records.lock().unwrap() = orders;
            store
        }

        fn failing_delete(self, id: &str) -> Self {
            self.fail_delete.lock().unwrap().insert(id.to_string());
            self
        }

        fn remote_ids(&self) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter_map(|o| o.id().map(str::to_string))
                .collect()
        }

        fn writes(&self) -> Vec<OrderAggregate> {
            self.writes.lock().unwrap().clone()
        }

        fn transport_error() -> ClientError {
            ClientError::InvalidResponse("store unavailable".to_string())
        }

        fn with_id(order: &OrderAggregate, id: &str) -> OrderAggregate {
            let mut json = serde_json::to_value(order).unwrap();
            json["id"] = serde_json::Value::String(id.to_string());
            serde_json::from_value(json).unwrap()
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn list_all(&self) -> Result<Vec<OrderAggregate>, StoreError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(StoreError::Fetch(Self::transport_error()));
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn get_one(&self, id: &str) -> Result<OrderAggregate, StoreError> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id() == Some(id))
                .cloned()
                .ok_or_else(|| StoreError::NotFoundOrFetch {
                    id: id.to_string(),
                    source: ClientError::NotFound(id.to_string()),
                })
        }

        async fn create(&self, draft: &OrderAggregate) -> Result<OrderAggregate, StoreError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
            let created = Self::with_id(&draft.persistable()?, &id);
            self.records.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: &str, order: &OrderAggregate) -> Result<OrderAggregate, StoreError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(StoreError::Update {
                    id: id.to_string(),
                    source: Self::transport_error(),
                });
            }
            let record = order.persistable()?;
            self.writes.lock().unwrap().push(record.clone());
            let mut records = self.records.lock().unwrap();
            match records.iter_mut().find(|o| o.id() == Some(id)) {
                Some(slot) => {
                    *slot = record.clone();
                    Ok(record)
                }
                None => Err(StoreError::Update {
                    id: id.to_string(),
                    source: ClientError::NotFound(id.to_string()),
                }),
            }
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail_delete.lock().unwrap().contains(id) {
                return Err(StoreError::Delete {
                    id: id.to_string(),
                    source: Self::transport_error(),
                });
            }
            self.records.lock().unwrap().retain(|o| o.id() != Some(id));
            Ok(())
        }
    }

    fn stored(id: &str, timestamp: i64, price: f64, paid: Option<f64>) -> OrderAggregate {
        let mut builder = OrderAggregate::builder(format!("Client {}", id))
            .id(id)
            .line("Lace", 1.0, price)
            .timestamp(timestamp);
        if let Some(paid) = paid {
            builder = builder.amount_paid(paid);
        }
        builder.build().unwrap()
    }

    fn three_orders() -> Vec<OrderAggregate> {
        vec![
            stored("1", 100, 10.0, None),
            stored("2", 300, 20.0, Some(5.0)),
            stored("3", 200, 30.0, Some(30.0)),
        ]
    }

    async fn loaded(store: MemoryStore) -> OrderCollectionController<MemoryStore> {
        let mut controller = OrderCollectionController::new(store);
        controller.refresh().await.unwrap();
        controller
    }

    fn local_ids<S: RecordStore>(controller: &OrderCollectionController<S>) -> Vec<&str> {
        controller.orders().iter().filter_map(|o| o.id()).collect()
    }

    #[tokio::test]
    async fn test_refresh_sorts_newest_first() {
        let controller = loaded(MemoryStore::with_orders(three_orders())).await;
        assert_eq!(local_ids(&controller), vec!["2", "3", "1"]);
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_collection() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        controller.store().fail_list.store(true, Ordering::SeqCst);

        let err = controller.refresh().await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Fetch(_))));
        assert_eq!(controller.orders().len(), 3);
        assert!(controller.last_error().unwrap().contains("Failed to fetch orders"));
    }

    #[tokio::test]
    async fn test_error_is_cleared_by_next_operation() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        controller.store().fail_list.store(true, Ordering::SeqCst);
        assert!(controller.refresh().await.is_err());
        assert!(controller.last_error().is_some());

        controller.store().fail_list.store(false, Ordering::SeqCst);
        controller.refresh().await.unwrap();
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn test_delete_one() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        controller.delete_one("3").await.unwrap();
        assert_eq!(local_ids(&controller), vec!["2", "1"]);
        assert_eq!(controller.store().remote_ids(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_failed_delete_one_keeps_collection() {
        let store = MemoryStore::with_orders(three_orders()).failing_delete("2");
        let mut controller = loaded(store).await;

        let err = controller.delete_one("2").await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Delete { .. })));
        assert_eq!(controller.orders().len(), 3);
        assert!(controller.take_error().is_some());
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_success_clears_collection() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        controller.delete_all().await.unwrap();
        assert!(controller.orders().is_empty());
        assert!(controller.store().remote_ids().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_partial_failure_leaves_collection_stale() {
        let store = MemoryStore::with_orders(three_orders()).failing_delete("2");
        let mut controller = loaded(store).await;

        let err = controller.delete_all().await.unwrap_err();
        assert!(matches!(err, SyncError::PartialBulkDelete { failed: 1, total: 3 }));
        assert_eq!(controller.orders().len(), 3);
        assert!(controller.last_error().unwrap().contains("could not be deleted"));

        controller.refresh().await.unwrap();
        assert_eq!(local_ids(&controller), vec!["2"]);
    }

    #[tokio::test]
    async fn test_delete_all_fans_out_concurrently() {
        let orders: Vec<_> = (1..=5).map(|i| stored(&i.to_string(), i, 1.0, None)).collect();
        let mut controller = loaded(MemoryStore::with_orders(orders)).await;
        controller.delete_all().await.unwrap();
        assert_eq!(controller.store().max_in_flight.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_delete_all_respects_concurrency_cap() {
        let orders: Vec<_> = (1..=6).map(|i| stored(&i.to_string(), i, 1.0, None)).collect();
        let mut controller = loaded(MemoryStore::with_orders(orders))
            .await
            .with_delete_concurrency(Some(2));
        controller.delete_all().await.unwrap();
        assert!(controller.store().max_in_flight.load(Ordering::SeqCst) <= 2);
        assert!(controller.orders().is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_on_empty_collection() {
        let mut controller = loaded(MemoryStore::default()).await;
        controller.delete_all().await.unwrap();
        assert!(controller.orders().is_empty());
    }

    #[tokio::test]
    async fn test_clear_payment_single_write() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let updated = controller.clear_payment("2").await.unwrap();

        assert_eq!(updated.payment_status(), PaymentStatus::Cleared);
        assert_eq!(updated.amount_paid(), 20.0);

        let writes = controller.store().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].payment_status(), PaymentStatus::Cleared);
        assert_eq!(writes[0].amount_paid_entered(), Some(20.0));
        // Whole record is sent, not just the payment fields
        assert_eq!(writes[0].products().len(), 1);
        assert_eq!(writes[0].client_name(), "Client 2");

        let local = controller.get("2").unwrap();
        assert_eq!(local.payment_status(), PaymentStatus::Cleared);
        assert_eq!(local.display_balance_due(), 0.0);
    }

    #[tokio::test]
    async fn test_clear_payment_is_idempotent() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let once = controller.clear_payment("1").await.unwrap();
        let twice = controller.clear_payment("1").await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(controller.get("1"), Some(&once));
    }

    #[tokio::test]
    async fn test_failed_clear_payment_keeps_order() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let before = controller.get("2").cloned();
        controller.store().fail_update.store(true, Ordering::SeqCst);

        assert!(controller.clear_payment("2").await.is_err());
        assert_eq!(controller.get("2").cloned(), before);
        assert!(controller.last_error().is_some());
    }

    #[tokio::test]
    async fn test_clear_payment_unknown_order() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let err = controller.clear_payment("99").await.unwrap_err();
        assert!(matches!(err, SyncError::UnknownOrder(id) if id == "99"));
        assert!(controller.store().writes().is_empty());
    }

    #[tokio::test]
    async fn test_create_inserts_newest_first() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let draft = OrderAggregate::builder("Walk-in")
            .line("Ribbon", 3.0, 4.0)
            .timestamp(1_000)
            .build()
            .unwrap();

        let created = controller.create(&draft).await.unwrap();
        assert_eq!(created.id(), Some("4"));
        assert_eq!(created.grand_total(), 12.0);
        assert_eq!(created.amount_paid_entered(), Some(0.0));
        assert_eq!(local_ids(&controller), vec!["4", "2", "3", "1"]);
    }

    #[tokio::test]
    async fn test_create_half_bill_drops_payment() {
        let mut controller = loaded(MemoryStore::default()).await;
        let mut draft = OrderAggregate::builder("Half")
            .line("Net", 2.0, 10.0)
            .amount_paid(20.0)
            .build()
            .unwrap();
        draft.set_bill_mode(BillMode::Half);

        let created = controller.create(&draft).await.unwrap();
        assert_eq!(created.amount_paid_entered(), Some(0.0));
        assert_eq!(created.payment_status(), PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_empty_draft_keeps_sent_status() {
        let mut controller = loaded(MemoryStore::default()).await;
        let draft = OrderAggregate::draft("Walk-in");
        let sent = draft.persistable().unwrap();

        let created = controller.create(&draft).await.unwrap();
        assert_eq!(created.payment_status(), sent.payment_status());
        assert_eq!(created.amount_paid_entered(), sent.amount_paid_entered());
        assert_eq!(created.grand_total(), 0.0);
    }

    #[tokio::test]
    async fn test_oversized_payment_is_rejected_before_writing() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        for amount in [1e30, f64::MAX, f64::INFINITY] {
            let err = controller.record_payment("1", amount).await.unwrap_err();
            assert!(matches!(err, SyncError::Order(_)), "{amount}");
            assert!(controller.last_error().is_some());
        }
        assert!(controller.store().writes().is_empty());
        assert_eq!(controller.get("1").unwrap().amount_paid_entered(), None);
    }

    #[tokio::test]
    async fn test_save_replaces_local_copy() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let mut edited = controller.load("1").await.unwrap();
        let id = edited.add_line_item();
        edited
            .update_line_item(id, shared::LineItemField::Count(Some(2.0)))
            .unwrap();
        edited
            .update_line_item(id, shared::LineItemField::Price(Some(2.5)))
            .unwrap();

        let saved = controller.save(&edited).await.unwrap();
        assert_eq!(saved.grand_total(), 15.0);
        assert_eq!(saved.timestamp(), 100);
        assert_eq!(controller.get("1").unwrap().grand_total(), 15.0);
        assert_eq!(controller.orders().len(), 3);
    }

    #[tokio::test]
    async fn test_save_requires_id() {
        let mut controller = loaded(MemoryStore::default()).await;
        let err = controller.save(&OrderAggregate::draft("x")).await.unwrap_err();
        assert!(matches!(err, SyncError::MissingId));
    }

    #[tokio::test]
    async fn test_load_missing_order() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let err = controller.load("42").await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::NotFoundOrFetch { .. })));
        assert_eq!(controller.orders().len(), 3);
    }

    #[tokio::test]
    async fn test_record_payment_derives_status() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let partial = controller.record_payment("1", 4.0).await.unwrap();
        assert_eq!(partial.payment_status(), PaymentStatus::Pending);
        assert_eq!(partial.balance_due(), 6.0);

        let full = controller.record_payment("1", 10.0).await.unwrap();
        assert_eq!(full.payment_status(), PaymentStatus::Cleared);
    }

    #[tokio::test]
    async fn test_record_payment_rejects_negative() {
        let mut controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let err = controller.record_payment("1", -3.0).await.unwrap_err();
        assert!(matches!(err, SyncError::Order(_)));
        assert!(controller.store().writes().is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_filters() {
        let controller = loaded(MemoryStore::with_orders(three_orders())).await;
        let stats = controller.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_grand_amount, 60.0);
        assert_eq!(stats.total_received, 35.0);
        assert_eq!(stats.total_pending, 25.0);

        assert_eq!(controller.filtered(StatusFilter::Cleared).len(), 1);
        assert_eq!(controller.filtered(StatusFilter::Pending).len(), 2);
        assert_eq!(controller.filtered(StatusFilter::All).len(), 3);
    }
}
