//! Status and category enums.
//!
//! Both are stored as lowercase strings by the backend.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// The lifecycle is linear with one exit:
///
/// ```text
/// pending -> confirmed -> shipped -> delivered
///    |           |
///    +-----------+--> rejected
/// ```
///
/// `delivered` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the customer, awaiting review.
    #[default]
    Pending,
    /// Accepted by the operator; a delivery date is usually attached.
    Confirmed,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Refused by the operator.
    Rejected,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Rejected,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Rejected)
    }

    /// Whether moving from `self` to `next` follows the lifecycle.
    ///
    /// Re-submitting the current status is allowed for non-terminal states
    /// so a confirmed order can have its delivery date changed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Pending | Self::Confirmed | Self::Rejected)
                | (Self::Confirmed, Self::Confirmed | Self::Shipped | Self::Rejected)
                | (Self::Shipped, Self::Shipped | Self::Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Catalog category of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Microcontrollers,
    Components,
    Tools,
    Kits,
    Projects,
}

impl Category {
    /// Every category, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Microcontrollers,
        Self::Components,
        Self::Tools,
        Self::Kits,
        Self::Projects,
    ];

    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Microcontrollers => "microcontrollers",
            Self::Components => "components",
            Self::Tools => "tools",
            Self::Kits => "kits",
            Self::Projects => "projects",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        use OrderStatus::{Confirmed, Delivered, Pending, Rejected, Shipped};

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Confirmed.can_transition_to(Shipped));
        assert!(Confirmed.can_transition_to(Rejected));
        assert!(Shipped.can_transition_to(Delivered));

        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Rejected));
        assert!(!Shipped.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_states_are_closed() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Rejected.can_transition_to(next));
        }
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"shipped\"");
        let parsed: OrderStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, OrderStatus::Rejected);
        assert_eq!("confirmed".parse::<OrderStatus>().unwrap(), OrderStatus::Confirmed);
        assert!("cancelled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_category_from_str_is_lenient_on_case() {
        assert_eq!("Kits".parse::<Category>().unwrap(), Category::Kits);
        assert_eq!(" tools ".parse::<Category>().unwrap(), Category::Tools);
        assert!("gadgets".parse::<Category>().is_err());
    }
}
