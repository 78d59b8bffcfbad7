use tracing::{error, info, warn};

use skusync_inventory::{ReconciliationEvent, ReconciliationObserver};

/// Observer that writes every checkpoint as a structured log record.
///
/// Skips and progress go to `info`, truncated sibling pages to `warn`,
/// failures and field-level rejections to `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReconciliationObserver for TracingObserver {
    fn emit(&self, event: ReconciliationEvent) {
        match event {
            ReconciliationEvent::Received { run_id, event } => info!(
                %run_id,
                item_id = %event.item_id(),
                location_id = %event.location_id(),
                quantity = event.new_quantity(),
                "same-sku sync: change received"
            ),
            ReconciliationEvent::Skipped { run_id, reason } => {
                info!(%run_id, %reason, "same-sku sync: skipped")
            }
            ReconciliationEvent::SkuResolved { run_id, item_id, sku } => {
                info!(%run_id, %item_id, %sku, "same-sku sync: sku resolved")
            }
            ReconciliationEvent::SiblingsFound {
                run_id,
                sku,
                count,
                dropped,
                truncated,
            } => {
                if truncated {
                    warn!(
                        %run_id, %sku, count, dropped,
                        "same-sku sync: sibling page is full, records past it are not updated"
                    );
                } else {
                    info!(%run_id, %sku, count, dropped, "same-sku sync: siblings found");
                }
            }
            ReconciliationEvent::Committed {
                run_id,
                sku,
                location_id,
                quantity,
                assignments,
                rejected,
            } => info!(
                %run_id, %sku, %location_id, quantity, assignments, rejected,
                "same-sku sync: quantities applied"
            ),
            ReconciliationEvent::FieldErrors { run_id, sku, errors } => {
                let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
                error!(
                    %run_id, %sku,
                    count = errors.len(),
                    errors = ?rendered,
                    "same-sku sync: catalog rejected part of the write"
                );
            }
            ReconciliationEvent::Failed { run_id, step, error } => {
                error!(%run_id, %step, %error, "same-sku sync: run failed")
            }
        }
    }
}
