use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Rescheduled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OutForDelivery => "OutForDelivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Rescheduled => "Rescheduled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::invalid(format!("Unknown order status '{}'", s)))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which statuses an order may move to from each current status.
///
/// A status with no entry may move anywhere. Setting an order to the
/// status it already has is never a transition and is not consulted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    rules: HashMap<OrderStatus, HashSet<OrderStatus>>,
}

impl TransitionPolicy {
    /// Every status is reachable from every other.
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn allow(mut self, from: OrderStatus, to: &[OrderStatus]) -> Self {
        self.rules.entry(from).or_default().extend(to.iter().copied());
        self
    }

    pub fn permits(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self.rules.get(&from) {
            Some(allowed) => allowed.contains(&to),
            None => true,
        }
    }

    pub fn is_permissive(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parses `Pending=Accepted|Cancelled;Accepted=Preparing`.
///
/// An empty right-hand side (`Delivered=`) makes the status terminal.
impl FromStr for TransitionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut policy = TransitionPolicy::permissive();
        for rule in s.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let (from, to) = rule
                .split_once('=')
                .ok_or_else(|| DomainError::invalid(format!("Malformed transition rule '{}'", rule)))?;
            let from: OrderStatus = from.trim().parse()?;
            let targets = to
                .split('|')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<OrderStatus>, _>>()?;
            policy.rules.entry(from).or_default().extend(targets);
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_enumerated_status() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn rejects_unknown_and_differently_cased_statuses() {
        assert!("Shipped".parse::<OrderStatus>().is_err());
        assert!("delivered".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serializes_with_variant_names() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OutForDelivery\"");
    }

    #[test]
    fn permissive_policy_allows_everything() {
        let policy = TransitionPolicy::permissive();
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(policy.permits(from, to));
            }
        }
        assert!(policy.is_permissive());
    }

    #[test]
    fn restricted_status_only_allows_listed_targets() {
        let policy = TransitionPolicy::permissive()
            .allow(OrderStatus::Delivered, &[])
            .allow(OrderStatus::Accepted, &[OrderStatus::Preparing, OrderStatus::Cancelled]);

        assert!(!policy.permits(OrderStatus::Delivered, OrderStatus::Pending));
        assert!(policy.permits(OrderStatus::Accepted, OrderStatus::Preparing));
        assert!(!policy.permits(OrderStatus::Accepted, OrderStatus::Delivered));
        // Unlisted statuses stay open.
        assert!(policy.permits(OrderStatus::Pending, OrderStatus::Rescheduled));
    }

    #[test]
    fn parses_rule_string() {
        let policy: TransitionPolicy = "Pending=Accepted|Cancelled; Delivered=".parse().unwrap();
        assert!(policy.permits(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(!policy.permits(OrderStatus::Pending, OrderStatus::Delivered));
        assert!(!policy.permits(OrderStatus::Delivered, OrderStatus::Cancelled));
        assert!(policy.permits(OrderStatus::Preparing, OrderStatus::Delivered));
    }

    #[test]
    fn empty_rule_string_is_permissive() {
        let policy: TransitionPolicy = "".parse().unwrap();
        assert!(policy.is_permissive());
    }

    #[test]
    fn rejects_malformed_rules() {
        assert!("Pending".parse::<TransitionPolicy>().is_err());
        assert!("Pending=Shipped".parse::<TransitionPolicy>().is_err());
        assert!("Nowhere=Pending".parse::<TransitionPolicy>().is_err());
    }
}
