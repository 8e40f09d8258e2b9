//! Roles and capabilities
//!
//! Every mutating operation on the server is gated by [`role_allows`].
//! Clients may use the same table to hide actions, but the server never
//! relies on that.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role, ordered from most to least privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Rank used for "may manage users of this role" decisions
    fn rank(&self) -> u8 {
        match self {
            Role::Superadmin => 3,
            Role::Admin => 2,
            Role::Manager => 1,
            Role::Staff => 0,
        }
    }

    /// Whether a user with this role may assign `other` to someone
    pub fn outranks(&self, other: Role) -> bool {
        *self == Role::Superadmin || self.rank() > other.rank()
    }

    /// All capability strings granted to this role (embedded in JWT claims)
    pub fn permissions(&self) -> Vec<String> {
        Capability::ALL
            .iter()
            .filter(|c| role_allows(*self, **c))
            .map(|c| c.as_str().to_string())
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A single permission checked by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Capability {
    /// Create orders, add/modify/remove items, apply coupons, update customer
    OrdersEdit,
    /// Send an order to the manager for billing
    OrdersTransfer,
    /// Accept a transferred order or return it to staff
    OrdersAccept,
    /// Record payment and close an order
    OrdersSettle,
    /// Cancel any order. Staff hold a narrower check, see [`may_cancel`].
    OrdersCancel,
    TablesManage,
    MenuManage,
    CouponsManage,
    ReportsView,
    LocationsManage,
    UsersApprove,
    FranchisesManage,
    SystemReconcile,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::OrdersEdit,
        Capability::OrdersTransfer,
        Capability::OrdersAccept,
        Capability::OrdersSettle,
        Capability::OrdersCancel,
        Capability::TablesManage,
        Capability::MenuManage,
        Capability::CouponsManage,
        Capability::ReportsView,
        Capability::LocationsManage,
        Capability::UsersApprove,
        Capability::FranchisesManage,
        Capability::SystemReconcile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::OrdersEdit => "orders:edit",
            Capability::OrdersTransfer => "orders:transfer",
            Capability::OrdersAccept => "orders:accept",
            Capability::OrdersSettle => "orders:settle",
            Capability::OrdersCancel => "orders:cancel",
            Capability::TablesManage => "tables:manage",
            Capability::MenuManage => "menu:manage",
            Capability::CouponsManage => "coupons:manage",
            Capability::ReportsView => "reports:view",
            Capability::LocationsManage => "locations:manage",
            Capability::UsersApprove => "users:approve",
            Capability::FranchisesManage => "franchises:manage",
            Capability::SystemReconcile => "system:reconcile",
        }
    }
}

impl From<Capability> for String {
    fn from(c: Capability) -> Self {
        c.as_str().to_string()
    }
}

impl TryFrom<String> for Capability {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown capability: {s}"))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single role/capability table.
pub fn role_allows(role: Role, capability: Capability) -> bool {
    use Capability::*;
    match role {
        Role::Superadmin => true,
        Role::Admin => !matches!(capability, FranchisesManage),
        Role::Manager => matches!(
            capability,
            OrdersEdit
                | OrdersTransfer
                | OrdersAccept
                | OrdersSettle
                | OrdersCancel
                | TablesManage
                | MenuManage
                | CouponsManage
                | ReportsView
        ),
        Role::Staff => matches!(capability, OrdersEdit | OrdersTransfer),
    }
}

/// Cancellation check including the staff rule: staff may cancel only
/// their own orders that have not been transferred yet.
pub fn may_cancel(role: Role, is_own_order: bool, before_transfer: bool) -> bool {
    role_allows(role, Capability::OrdersCancel)
        || (role == Role::Staff && is_own_order && before_transfer)
}
