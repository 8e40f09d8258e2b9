//! SettleOrder command handler
//!
//! Records the payment, consumes the pending record and releases tables no
//! other open order still uses. All of it commits in one transaction.

use crate::orders::money;
use crate::orders::occupancy;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderStatus, PaymentMethod, PaymentRecord};

/// SettleOrder action
#[derive(Debug, Clone)]
pub struct SettleOrderAction {
    pub order_id: String,
    pub method: PaymentMethod,
    pub tendered: f64,
}

impl CommandHandler for SettleOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate status and payment
        if snapshot.status != OrderStatus::PendingSettlement {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "settle",
            ));
        }
        money::validate_tendered(self.tendered)?;
        if !money::is_payment_sufficient(self.tendered, snapshot.total) {
            return Err(OrderError::InsufficientPayment {
                total: snapshot.total,
                tendered: self.tendered,
            });
        }

        // 3. Consume pending record
        if !ctx.remove_pending_record(&self.order_id)? {
            return Err(OrderError::PendingRecordNotFound(self.order_id.clone()));
        }

        // 4. Release tables
        let released_table_ids =
            occupancy::release_tables_if_unreferenced(ctx, &snapshot.table_ids, &self.order_id)?;

        let payment = PaymentRecord {
            method: self.method,
            amount: snapshot.total,
            tendered: self.tendered,
            change: money::change_due(self.tendered, snapshot.total),
            recorded_by: metadata.operator_id,
            recorded_at: shared::util::now_millis(),
        };

        tracing::info!(
            order_id = %self.order_id,
            order_number = %snapshot.order_number,
            method = %self.method,
            total = snapshot.total,
            released = ?released_table_ids,
            "Order settled"
        );

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderSettled {
                payment,
                released_table_ids,
            },
        );
        Ok(vec![event])
    }
}
