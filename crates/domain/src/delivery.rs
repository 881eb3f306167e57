//! Delivery owned by an order.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::DeliveryId;
use crate::member::Address;

/// The state of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Waiting to be shipped.
    #[default]
    Ready,

    /// Delivered; the owning order can no longer be cancelled.
    Completed,
}

impl DeliveryStatus {
    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Ready => "READY",
            DeliveryStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY" => Ok(DeliveryStatus::Ready),
            "COMPLETED" => Ok(DeliveryStatus::Completed),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// A delivery to the address the order was placed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub address: Address,
    pub status: DeliveryStatus,
}

impl Delivery {
    /// Creates a delivery in READY state.
    pub fn ready(address: Address) -> Self {
        Self {
            id: DeliveryId::new(),
            address,
            status: DeliveryStatus::Ready,
        }
    }

    /// Marks the delivery COMPLETED. Only READY deliveries can complete.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status == DeliveryStatus::Completed {
            return Err(DomainError::InvalidState {
                action: "complete delivery",
                state: "already completed",
            });
        }
        self.status = DeliveryStatus::Completed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ready_then_complete() {
        let mut delivery = Delivery::ready(Address::new("Seoul", "111", "12345"));
        assert_eq!(delivery.status, DeliveryStatus::Ready);
        delivery.complete().unwrap();
        assert_eq!(delivery.status, DeliveryStatus::Completed);
    }

    #[test]
    fn complete_twice_fails() {
        let mut delivery = Delivery::ready(Address::new("Seoul", "111", "12345"));
        delivery.complete().unwrap();
        assert!(matches!(
            delivery.complete(),
            Err(DomainError::InvalidState { .. })
        ));
    }

    #[test]
    fn status_string_roundtrip() {
        for status in [DeliveryStatus::Ready, DeliveryStatus::Completed] {
            assert_eq!(DeliveryStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(DeliveryStatus::from_str("SHIPPED").is_err());
    }
}
