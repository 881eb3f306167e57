//! Member registration and maintenance.

use domain::{Member, MemberId};
use store::ShopStore;

use crate::error::ServiceError;

/// Service for managing members.
pub struct MemberService<S: ShopStore> {
    store: S,
}

impl<S: ShopStore> MemberService<S> {
    /// Creates a new member service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a member. Names must be unique.
    #[tracing::instrument(skip(self, member), fields(name = %member.name))]
    pub async fn join(&self, member: Member) -> Result<MemberId, ServiceError> {
        if !self.store.members_named(&member.name).await?.is_empty() {
            return Err(ServiceError::DuplicateMemberName(member.name));
        }

        self.store.insert_member(&member).await?;
        Ok(member.id)
    }

    /// Loads a member by ID.
    #[tracing::instrument(skip(self))]
    pub async fn member(&self, id: MemberId) -> Result<Member, ServiceError> {
        self.store
            .member(id)
            .await?
            .ok_or(ServiceError::MemberNotFound(id))
    }

    /// Lists all members.
    #[tracing::instrument(skip(self))]
    pub async fn members(&self) -> Result<Vec<Member>, ServiceError> {
        Ok(self.store.members().await?)
    }

    /// Renames a member.
    #[tracing::instrument(skip(self))]
    pub async fn update_name(&self, id: MemberId, name: &str) -> Result<(), ServiceError> {
        // load first so a missing ID surfaces as not-found, not a no-op
        self.member(id).await?;
        self.store.rename_member(id, name).await?;
        Ok(())
    }
}
