//! ApplyDishCoupon command handler
//!
//! A coupon takes `floor(price × pct / 100)` off one unit of every line of
//! its dish. Applying a second coupon replaces the first.

use crate::db::repository::coupon;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{AppliedCoupon, EventPayload, OrderEvent};

/// ApplyDishCoupon action
#[derive(Debug, Clone)]
pub struct ApplyDishCouponAction {
    pub order_id: String,
    pub code: String,
}

impl CommandHandler for ApplyDishCouponAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let snapshot = ctx.load_snapshot(&self.order_id)?;
        if !snapshot.status.is_editable() {
            return Err(OrderError::for_status(
                &self.order_id,
                snapshot.status,
                "apply a coupon to",
            ));
        }

        let code = coupon::normalize_code(&self.code);
        let found = coupon::find_code_in(ctx.txn(), snapshot.location_id, &code)?
            .ok_or_else(|| OrderError::CouponNotFound(code.clone()))?;
        if !found.is_active {
            return Err(OrderError::CouponInactive(code));
        }
        let matches_item = snapshot
            .items
            .iter()
            .any(|item| item.menu_item_id == Some(found.menu_item_id));
        if !matches_item {
            return Err(OrderError::CouponNotApplicable(code));
        }

        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::DishCouponApplied {
                coupon: AppliedCoupon {
                    coupon_id: found.id,
                    code,
                    menu_item_id: found.menu_item_id,
                    percentage: found.percentage,
                },
            },
        );
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::*;
    use crate::orders::storage::OrderStorage;
    use shared::models::Role;
    use shared::order::OrderStatus;

    fn apply(code: &str) -> ApplyDishCouponAction {
        ApplyDishCouponAction {
            order_id: "o-1".into(),
            code: code.into(),
        }
    }

    #[test]
    fn test_apply_matching_coupon() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_coupon(&txn, "BIRYANI10", 55, true);
        store_order(
            &storage,
            &txn,
            "o-1",
            OrderStatus::Ongoing,
            vec![],
            vec![line("biryani", 55, 169.0, 2)],
        );

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let events = apply(" biryani10 ")
            .execute(&mut ctx, &metadata(Role::Staff))
            .unwrap();
        let EventPayload::DishCouponApplied { coupon } = &events[0].payload else {
            panic!("expected DishCouponApplied");
        };
        assert_eq!(coupon.code, "BIRYANI10");
        assert_eq!(coupon.menu_item_id, 55);
        assert_eq!(coupon.percentage, 10.0);
    }

    #[test]
    fn test_coupon_errors() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_coupon(&txn, "LASSI20", 77, false);
        store_order(
            &storage,
            &txn,
            "o-1",
            OrderStatus::Ongoing,
            vec![],
            vec![line("biryani", 55, 169.0, 2)],
        );

        let mut ctx = CommandContext::new(&txn, &storage, 0);
        let meta = metadata(Role::Staff);
        assert!(matches!(
            apply("NOPE").execute(&mut ctx, &meta),
            Err(OrderError::CouponNotFound(_))
        ));
        assert!(matches!(
            apply("LASSI20").execute(&mut ctx, &meta),
            Err(OrderError::CouponInactive(_))
        ));

        seed_coupon(&txn, "LASSI20", 77, true);
        assert!(matches!(
            apply("LASSI20").execute(&mut ctx, &meta),
            Err(OrderError::CouponNotApplicable(_))
        ));
    }
}
