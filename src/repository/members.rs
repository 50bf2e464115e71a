//! Members repository

use chrono::NaiveDate;

use super::{Collection, Ledger};
use crate::{
    error::{AppError, AppResult},
    models::{Member, MemberId, MemberStatus, RegisterMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    ledger: Ledger,
}

impl MembersRepository {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub async fn list(&self) -> Vec<Member> {
        self.ledger
            .read(|state| state.members.values().cloned().collect())
            .await
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: MemberId) -> AppResult<Member> {
        self.ledger
            .read(|state| state.members.get(&id).cloned())
            .await
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    pub async fn search(&self, term: &str) -> Vec<Member> {
        self.ledger
            .read(|state| {
                state
                    .members
                    .values()
                    .filter(|m| m.matches(term))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn create(&self, member: RegisterMember, join_date: NaiveDate) -> AppResult<Member> {
        let member = member.into_member(join_date);
        self.ledger
            .commit(&[Collection::Members], move |state| {
                if state.members.contains_key(&member.id) {
                    return Err(AppError::Internal(format!(
                        "Member id {} already in use",
                        member.id
                    )));
                }
                state.members.insert(member.id, member.clone());
                Ok(member)
            })
            .await
    }

    pub async fn update_status(&self, id: MemberId, status: MemberStatus) -> AppResult<Member> {
        self.ledger
            .commit(&[Collection::Members], move |state| {
                let member = state
                    .members
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;
                member.status = status;
                Ok(member.clone())
            })
            .await
    }

    /// Remove a member that has no open loans
    pub async fn delete(&self, id: MemberId) -> AppResult<Member> {
        self.ledger
            .commit(&[Collection::Members], move |state| {
                if !state.members.contains_key(&id) {
                    return Err(AppError::NotFound(format!("Member with id {} not found", id)));
                }
                let open = state.open_loans_for_member(id);
                if open > 0 {
                    return Err(AppError::Conflict(format!(
                        "Member {} still has {} open loans",
                        id, open
                    )));
                }
                state
                    .members
                    .shift_remove(&id)
                    .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
            })
            .await
    }
}
