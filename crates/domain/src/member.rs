//! Members and the embedded address value.

use serde::{Deserialize, Serialize};

use crate::ids::MemberId;

/// Postal address embedded in members and deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl Address {
    /// Creates an address from its parts.
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            street: street.into(),
            zipcode: zipcode.into(),
        }
    }
}

/// A registered member.
///
/// Members do not hold their orders; the order side owns the reference and
/// member-to-orders is a store query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub address: Address,
}

impl Member {
    /// Registers a new member with a fresh ID.
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            id: MemberId::new(),
            name: name.into(),
            address,
        }
    }
}
