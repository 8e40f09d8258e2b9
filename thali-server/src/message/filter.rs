//! Per-subscriber filtering
//!
//! Messages tagged with a location go only to callers whose scope contains
//! it. Untagged messages are global.

use shared::message::BusMessage;

use crate::auth::LocationScope;

pub fn visible_to(msg: &BusMessage, scope: &LocationScope) -> bool {
    match msg.location_id {
        Some(location_id) => scope.allows(location_id),
        None => true,
    }
}
