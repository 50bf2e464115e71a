//! Member roster service

use std::sync::Arc;

use validator::Validate;

use crate::{
    clock::Clock,
    error::AppResult,
    models::{Member, MemberId, MemberStatus, RegisterMember},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl MembersService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn list_members(&self) -> Vec<Member> {
        self.repository.members.list().await
    }

    pub async fn get_member(&self, id: MemberId) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Name/email search, case-insensitive
    pub async fn search_members(&self, term: &str) -> Vec<Member> {
        self.repository.members.search(term).await
    }

    /// Register a new member: ACTIVE, joined today
    pub async fn register_member(&self, member: RegisterMember) -> AppResult<Member> {
        member.validate()?;
        let created = self
            .repository
            .members
            .create(member, self.clock.today())
            .await?;
        tracing::info!("Member registered: {} id={}", created.name, created.id);
        Ok(created)
    }

    pub async fn set_member_status(&self, id: MemberId, status: MemberStatus) -> AppResult<Member> {
        let member = self.repository.members.update_status(id, status).await?;
        tracing::info!("Member {} id={} is now {}", member.name, member.id, member.status);
        Ok(member)
    }

    /// Remove a member; refused while they hold open loans
    pub async fn remove_member(&self, id: MemberId) -> AppResult<()> {
        let removed = self.repository.members.delete(id).await?;
        tracing::info!("Member removed: {} id={}", removed.name, removed.id);
        Ok(())
    }
}
