//! Integration tests for the full reconciliation pipeline.
//!
//! Tests: payload -> Normalizer -> SKU Resolver -> Sibling Locator -> bulk write
//!
//! Verifies:
//! - Every early exit issues only the catalog calls it needs
//! - The bulk write mirrors the trigger's location and quantity
//! - Failures and field errors never escape the orchestrator

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use skusync_core::{InventoryItemId, LocationId};
    use skusync_inventory::{
        CatalogError, FailureCause, InMemoryObserver, ItemQuantity, Orchestrator,
        ReconciliationEvent, RecentCommitGuard, RunOutcome, SetQuantitiesOptions, SkipReason,
        Step, SIBLING_PAGE_SIZE,
    };
    use skusync_events::{ChangeEvent, RejectReason};

    use crate::catalog::{CatalogCall, CatalogOp, InMemoryCatalog};

    fn id(s: &str) -> InventoryItemId {
        s.parse().unwrap()
    }

    fn loc(s: &str) -> LocationId {
        s.parse().unwrap()
    }

    fn abc_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_item(id("I1"), Some("ABC"))
            .with_item(id("I2"), Some("ABC"))
            .with_item(id("I3"), Some("ABC"))
            .with_item(id("X1"), Some("XYZ"))
    }

    fn setup(catalog: InMemoryCatalog) -> (Orchestrator, Arc<InMemoryCatalog>, Arc<InMemoryObserver>) {
        let catalog = Arc::new(catalog);
        let observer = Arc::new(InMemoryObserver::new());
        let orchestrator = Orchestrator::new(catalog.clone()).with_observer(observer.clone());
        (orchestrator, catalog, observer)
    }

    fn payload(item: &str, location: &str, available: i64) -> serde_json::Value {
        json!({ "inventory_item_id": item, "location_id": location, "available": available })
    }

    fn quantities(call: &CatalogCall) -> Vec<(String, i64)> {
        match call {
            CatalogCall::SetQuantities { quantities, .. } => quantities
                .iter()
                .map(|q: &ItemQuantity| (q.item_id.to_string(), q.quantity))
                .collect(),
            other => panic!("expected SetQuantities, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_events_are_skipped_without_catalog_calls() {
        let (orchestrator, catalog, _) = setup(abc_catalog());

        let cases = [
            json!({ "location_id": "L1", "available": 7 }),
            json!({ "inventory_item_id": "I1", "available": 7 }),
            json!({ "inventory_item_id": "I1", "location_id": "L1" }),
            json!({ "inventory_item_id": "I1", "location_id": "L1", "available": null }),
        ];
        for p in cases {
            let outcome = orchestrator.handle_payload(&p).await;
            assert!(matches!(
                outcome,
                RunOutcome::Skipped(SkipReason::Rejected(RejectReason::MissingField(_)))
            ));
        }

        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn item_without_sku_stops_after_one_lookup() {
        let (orchestrator, catalog, _) = setup(abc_catalog().with_item(id("N1"), None));

        let outcome = orchestrator.handle_payload(&payload("N1", "L1", 3)).await;

        assert_eq!(outcome, RunOutcome::Skipped(SkipReason::NoSku(id("N1"))));
        assert_eq!(catalog.calls(), vec![CatalogCall::ResolveSku(id("N1"))]);
    }

    #[tokio::test]
    async fn sku_without_siblings_stops_after_two_lookups() {
        let (orchestrator, catalog, _) = setup(InMemoryCatalog::new().with_unlisted_item(id("I1"), "ABC"));

        let outcome = orchestrator.handle_payload(&payload("I1", "L1", 3)).await;

        assert_eq!(
            outcome,
            RunOutcome::Skipped(SkipReason::NoSiblings(skusync_inventory::Sku::new("ABC").unwrap()))
        );
        assert_eq!(
            catalog.calls(),
            vec![
                CatalogCall::ResolveSku(id("I1")),
                CatalogCall::FindSiblings {
                    sku: "ABC".to_string(),
                    limit: SIBLING_PAGE_SIZE,
                },
            ]
        );
    }

    #[tokio::test]
    async fn siblings_without_item_ids_are_skipped() {
        let catalog = InMemoryCatalog::new()
            .with_unlisted_item(id("I1"), "ABC")
            .with_unlinked_variant("ABC")
            .with_unlinked_variant("ABC");
        let (orchestrator, catalog, _) = setup(catalog);

        let outcome = orchestrator.handle_payload(&payload("I1", "L1", 3)).await;

        assert!(matches!(
            outcome,
            RunOutcome::Skipped(SkipReason::NoResolvableSiblings { returned: 2, .. })
        ));
        assert_eq!(catalog.call_count(CatalogOp::SetQuantities), 0);
    }

    #[tokio::test]
    async fn same_sku_siblings_receive_the_trigger_quantity() {
        let (orchestrator, catalog, observer) = setup(abc_catalog());

        let outcome = orchestrator.handle_payload(&payload("I1", "L1", 7)).await;
        assert!(outcome.is_committed());

        let writes: Vec<CatalogCall> = catalog
            .calls()
            .into_iter()
            .filter(|c| c.op() == CatalogOp::SetQuantities)
            .collect();
        assert_eq!(writes.len(), 1);
        match &writes[0] {
            CatalogCall::SetQuantities {
                location_id,
                options,
                ..
            } => {
                assert_eq!(location_id, &loc("L1"));
                assert_eq!(options, &SetQuantitiesOptions::default());
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(
            quantities(&writes[0]),
            vec![("I1".to_string(), 7), ("I2".to_string(), 7), ("I3".to_string(), 7)]
        );

        // Records with another SKU are untouched.
        assert_eq!(catalog.level(&id("X1"), &loc("L1")), None);
        assert_eq!(catalog.level(&id("I3"), &loc("L1")), Some(7));

        let committed = observer
            .all()
            .into_iter()
            .find(|e| matches!(e, ReconciliationEvent::Committed { .. }));
        assert!(matches!(
            committed,
            Some(ReconciliationEvent::Committed { assignments: 3, rejected: 0, quantity: 7, .. })
        ));
    }

    #[tokio::test]
    async fn zero_quantity_is_propagated() {
        let (orchestrator, catalog, _) = setup(abc_catalog());

        let outcome = orchestrator.handle_payload(&payload("I2", "L1", 0)).await;
        assert!(outcome.is_committed());

        let write = catalog
            .calls()
            .into_iter()
            .find(|c| c.op() == CatalogOp::SetQuantities)
            .unwrap();
        assert!(quantities(&write).iter().all(|(_, q)| *q == 0));
        assert_eq!(quantities(&write).len(), 3);
    }

    #[tokio::test]
    async fn replaying_an_event_produces_identical_writes() {
        let (orchestrator, catalog, _) = setup(abc_catalog());

        orchestrator.handle_payload(&payload("I1", "L1", 5)).await;
        orchestrator.handle_payload(&payload("I1", "L1", 5)).await;

        let writes: Vec<CatalogCall> = catalog
            .calls()
            .into_iter()
            .filter(|c| c.op() == CatalogOp::SetQuantities)
            .collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], writes[1]);
    }

    #[tokio::test]
    async fn partial_rejection_still_commits_and_is_reported() {
        let (orchestrator, catalog, observer) = setup(abc_catalog());
        catalog.reject_next(1, "Inventory item is not stocked at the location");

        let outcome = orchestrator.handle_payload(&payload("I1", "L1", 9)).await;

        let report = match outcome {
            RunOutcome::Committed(report) => report,
            other => panic!("expected commit, got {other:?}"),
        };
        assert_eq!(report.field_errors.len(), 1);
        assert_eq!(report.applied().len(), 2);

        // The rejected record keeps its old value, the others are not rolled back.
        assert_eq!(catalog.level(&id("I2"), &loc("L1")), None);
        assert_eq!(catalog.level(&id("I3"), &loc("L1")), Some(9));

        let field_errors: Vec<ReconciliationEvent> = observer
            .all()
            .into_iter()
            .filter(|e| matches!(e, ReconciliationEvent::FieldErrors { .. }))
            .collect();
        assert_eq!(field_errors.len(), 1);
    }

    #[tokio::test]
    async fn catalog_failure_is_absorbed_at_each_step() {
        for (op, step) in [
            (CatalogOp::ResolveSku, Step::ResolveSku),
            (CatalogOp::FindSiblings, Step::FindSiblings),
            (CatalogOp::SetQuantities, Step::SetQuantities),
        ] {
            let (orchestrator, catalog, observer) = setup(abc_catalog());
            catalog.fail_on(op, CatalogError::transport("connection reset"));

            let outcome = orchestrator.handle_payload(&payload("I1", "L1", 2)).await;

            match outcome {
                RunOutcome::Failed(failure) => {
                    assert_eq!(failure.step, step);
                    assert_eq!(
                        failure.cause,
                        FailureCause::Catalog(CatalogError::transport("connection reset"))
                    );
                }
                other => panic!("expected failure, got {other:?}"),
            }
            assert!(observer
                .all()
                .iter()
                .any(|e| matches!(e, ReconciliationEvent::Failed { step: s, .. } if *s == step)));
        }
    }

    #[tokio::test]
    async fn every_run_emits_one_terminal_checkpoint() {
        let (orchestrator, _catalog, observer) = setup(abc_catalog().with_item(id("N1"), None));

        orchestrator.handle_payload(&payload("I1", "L1", 1)).await;
        orchestrator.handle_payload(&payload("N1", "L1", 1)).await;
        orchestrator.handle_payload(&json!({})).await;

        let events = observer.all();
        let terminal = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    ReconciliationEvent::Skipped { .. }
                        | ReconciliationEvent::Committed { .. }
                        | ReconciliationEvent::Failed { .. }
                )
            })
            .count();
        assert_eq!(terminal, 3);

        let mut run_ids: Vec<_> = events.iter().map(ReconciliationEvent::run_id).collect();
        run_ids.dedup();
        assert_eq!(run_ids.len(), 3);
    }

    #[tokio::test]
    async fn echo_guard_suppresses_notifications_for_our_own_writes() {
        let catalog = Arc::new(abc_catalog());
        let guard = Arc::new(RecentCommitGuard::new(Duration::from_secs(60)));
        let orchestrator = Orchestrator::new(catalog.clone()).with_echo_guard(guard.clone());

        assert!(orchestrator.handle_payload(&payload("I1", "L1", 4)).await.is_committed());

        // The platform echoes the writes to I2 and I3.
        for sibling in ["I2", "I3"] {
            let outcome = orchestrator.handle_payload(&payload(sibling, "L1", 4)).await;
            assert_eq!(outcome, RunOutcome::Skipped(SkipReason::EchoSuppressed));
        }
        assert_eq!(catalog.call_count(CatalogOp::SetQuantities), 1);
        assert!(guard.is_empty());

        // A genuine change afterwards is reconciled again.
        assert!(orchestrator.handle_payload(&payload("I2", "L1", 1)).await.is_committed());
        assert_eq!(catalog.call_count(CatalogOp::SetQuantities), 2);
    }

    #[tokio::test]
    async fn echo_guard_lets_a_genuine_change_back_to_a_written_value_through() {
        // I2 already holds 4, so writing 4 to it produces no echo.
        let catalog = Arc::new(
            InMemoryCatalog::new()
                .with_item(id("I1"), Some("ABC"))
                .with_item(id("I2"), Some("ABC"))
                .with_level(id("I2"), loc("L1"), 4),
        );
        let guard = Arc::new(RecentCommitGuard::new(Duration::from_secs(60)));
        let orchestrator = Orchestrator::new(catalog.clone()).with_echo_guard(guard);

        assert!(orchestrator.handle_payload(&payload("I1", "L1", 4)).await.is_committed());
        assert!(orchestrator.handle_payload(&payload("I2", "L1", 5)).await.is_committed());

        let outcome = orchestrator.handle_payload(&payload("I2", "L1", 4)).await;
        assert_eq!(outcome.skip_reason(), None);
        assert!(outcome.is_committed());
        assert_eq!(catalog.level(&id("I1"), &loc("L1")), Some(4));
        assert_eq!(catalog.level(&id("I2"), &loc("L1")), Some(4));
    }

    #[tokio::test]
    async fn configured_write_options_are_sent_with_the_bulk_write() {
        let options = SetQuantitiesOptions {
            quantity_name: "on_hand".to_string(),
            reason: "restock".to_string(),
            ignore_compare_quantity: false,
        };
        let catalog = Arc::new(abc_catalog());
        let orchestrator = Orchestrator::new(catalog.clone()).with_options(options.clone());

        let event = ChangeEvent::new(id("I3"), loc("L2"), 12);
        let outcome = orchestrator.reconcile(&event).await;
        assert!(outcome.is_committed());

        let write = catalog
            .calls()
            .into_iter()
            .find(|c| c.op() == CatalogOp::SetQuantities)
            .unwrap();
        match &write {
            CatalogCall::SetQuantities {
                location_id,
                options: sent,
                ..
            } => {
                assert_eq!(location_id, &loc("L2"));
                assert_eq!(sent, &options);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(quantities(&write).len(), 3);
    }

    #[tokio::test]
    async fn without_guard_echoes_converge_to_the_same_value() {
        let (orchestrator, catalog, _) = setup(abc_catalog());

        orchestrator.handle_payload(&payload("I1", "L1", 4)).await;
        orchestrator.handle_payload(&payload("I2", "L1", 4)).await;

        let writes: Vec<Vec<(String, i64)>> = catalog
            .calls()
            .iter()
            .filter(|c| c.op() == CatalogOp::SetQuantities)
            .map(quantities)
            .collect();
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().flatten().all(|(_, q)| *q == 4));
    }

    #[tokio::test]
    async fn isolated_run_turns_a_panic_into_a_failure() {
        use async_trait::async_trait;
        use skusync_inventory::{CatalogApi, CatalogItem, FieldError, Sku};

        struct Exploding;

        #[async_trait]
        impl CatalogApi for Exploding {
            async fn resolve_sku(&self, _: &InventoryItemId) -> Result<Option<String>, CatalogError> {
                panic!("catalog client bug");
            }

            async fn find_siblings(&self, _: &Sku, _: usize) -> Result<Vec<CatalogItem>, CatalogError> {
                Ok(vec![])
            }

            async fn set_quantities(
                &self,
                _: &LocationId,
                _: &[ItemQuantity],
                _: &SetQuantitiesOptions,
            ) -> Result<Vec<FieldError>, CatalogError> {
                Ok(vec![])
            }
        }

        let observer = Arc::new(InMemoryObserver::new());
        let orchestrator =
            Arc::new(Orchestrator::new(Arc::new(Exploding)).with_observer(observer.clone()));

        let outcome = orchestrator.handle_isolated(payload("I1", "L1", 1)).await;

        assert!(matches!(
            outcome,
            RunOutcome::Failed(ref f) if f.step == Step::Unknown && matches!(f.cause, FailureCause::Panicked(_))
        ));
        assert!(observer
            .all()
            .iter()
            .any(|e| matches!(e, ReconciliationEvent::Failed { step: Step::Unknown, .. })));
    }
}
