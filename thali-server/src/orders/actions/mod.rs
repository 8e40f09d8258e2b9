//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use chrono_tz::Tz;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::Capability;
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

mod accept_order;
mod add_items;
mod apply_dish_coupon;
mod cancel_order;
mod confirm_order;
mod create_order;
mod modify_item_quantity;
mod remove_item;
mod return_to_staff;
mod settle_order;
mod transfer_order;
mod update_customer;

pub use accept_order::AcceptOrderAction;
pub use add_items::AddItemsAction;
pub use apply_dish_coupon::ApplyDishCouponAction;
pub use cancel_order::CancelOrderAction;
pub use confirm_order::ConfirmOrderAction;
pub use create_order::{CreateOrderAction, format_order_number};
pub use modify_item_quantity::ModifyItemQuantityAction;
pub use remove_item::RemoveItemAction;
pub use return_to_staff::ReturnToStaffAction;
pub use settle_order::SettleOrderAction;
pub use transfer_order::TransferOrderAction;
pub use update_customer::UpdateCustomerAction;

/// CommandAction enum - dispatches to concrete action implementations
#[derive(Debug, Clone)]
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    ConfirmOrder(ConfirmOrderAction),
    AddItems(AddItemsAction),
    ModifyItemQuantity(ModifyItemQuantityAction),
    RemoveItem(RemoveItemAction),
    UpdateCustomer(UpdateCustomerAction),
    ApplyDishCoupon(ApplyDishCouponAction),
    TransferOrder(TransferOrderAction),
    ReturnToStaff(ReturnToStaffAction),
    AcceptOrder(AcceptOrderAction),
    SettleOrder(SettleOrderAction),
    CancelOrder(CancelOrderAction),
}

impl CommandAction {
    /// Capability the operator's role must hold.
    ///
    /// `None` for cancel: staff may cancel their own pre-transfer orders, which
    /// needs the snapshot and is checked by the action.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            CommandAction::CreateOrder(_)
            | CommandAction::ConfirmOrder(_)
            | CommandAction::AddItems(_)
            | CommandAction::ModifyItemQuantity(_)
            | CommandAction::RemoveItem(_)
            | CommandAction::UpdateCustomer(_)
            | CommandAction::ApplyDishCoupon(_) => Some(Capability::OrdersEdit),
            CommandAction::TransferOrder(_) => Some(Capability::OrdersTransfer),
            CommandAction::ReturnToStaff(_) | CommandAction::AcceptOrder(_) => {
                Some(Capability::OrdersAccept)
            }
            CommandAction::SettleOrder(_) => Some(Capability::OrdersSettle),
            CommandAction::CancelOrder(_) => None,
        }
    }

    /// Convert an OrderCommand to its action.
    ///
    /// This is the ONLY place with a match on OrderCommandPayload. `tz` is
    /// the business timezone used to date new order numbers.
    pub fn from_command(cmd: &OrderCommand, tz: Tz) -> Self {
        match &cmd.payload {
            OrderCommandPayload::CreateOrder {
                location_id,
                order_type,
                table_ids,
                items,
                customer,
                confirm,
            } => CommandAction::CreateOrder(CreateOrderAction {
                location_id: *location_id,
                order_type: *order_type,
                table_ids: table_ids.clone(),
                items: items.clone(),
                customer: customer.clone(),
                confirm: *confirm,
                tz,
            }),
            OrderCommandPayload::ConfirmOrder { order_id } => {
                CommandAction::ConfirmOrder(ConfirmOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::AddItems { order_id, items } => {
                CommandAction::AddItems(AddItemsAction {
                    order_id: order_id.clone(),
                    items: items.clone(),
                })
            }
            OrderCommandPayload::ModifyItemQuantity {
                order_id,
                instance_id,
                quantity,
            } => CommandAction::ModifyItemQuantity(ModifyItemQuantityAction {
                order_id: order_id.clone(),
                instance_id: instance_id.clone(),
                quantity: *quantity,
            }),
            OrderCommandPayload::RemoveItem {
                order_id,
                instance_id,
            } => CommandAction::RemoveItem(RemoveItemAction {
                order_id: order_id.clone(),
                instance_id: instance_id.clone(),
            }),
            OrderCommandPayload::UpdateCustomer { order_id, customer } => {
                CommandAction::UpdateCustomer(UpdateCustomerAction {
                    order_id: order_id.clone(),
                    customer: customer.clone(),
                })
            }
            OrderCommandPayload::ApplyDishCoupon { order_id, code } => {
                CommandAction::ApplyDishCoupon(ApplyDishCouponAction {
                    order_id: order_id.clone(),
                    code: code.clone(),
                })
            }
            OrderCommandPayload::TransferOrder { order_id } => {
                CommandAction::TransferOrder(TransferOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::ReturnToStaff { order_id, reason } => {
                CommandAction::ReturnToStaff(ReturnToStaffAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::AcceptOrder { order_id } => {
                CommandAction::AcceptOrder(AcceptOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::SettleOrder {
                order_id,
                method,
                tendered,
            } => CommandAction::SettleOrder(SettleOrderAction {
                order_id: order_id.clone(),
                method: *method,
                tendered: *tendered,
            }),
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
        }
    }
}

/// Manual implementation of CommandHandler for CommandAction
impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(action) => action.execute(ctx, metadata),
            CommandAction::ConfirmOrder(action) => action.execute(ctx, metadata),
            CommandAction::AddItems(action) => action.execute(ctx, metadata),
            CommandAction::ModifyItemQuantity(action) => action.execute(ctx, metadata),
            CommandAction::RemoveItem(action) => action.execute(ctx, metadata),
            CommandAction::UpdateCustomer(action) => action.execute(ctx, metadata),
            CommandAction::ApplyDishCoupon(action) => action.execute(ctx, metadata),
            CommandAction::TransferOrder(action) => action.execute(ctx, metadata),
            CommandAction::ReturnToStaff(action) => action.execute(ctx, metadata),
            CommandAction::AcceptOrder(action) => action.execute(ctx, metadata),
            CommandAction::SettleOrder(action) => action.execute(ctx, metadata),
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata),
        }
    }
}
