//! Derives a request's status from the decisions recorded against it.

use chrono::NaiveDate;

use crate::model::approval::Approval;
use crate::model::permission_request::PermissionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedStatus {
    pub status: PermissionStatus,
    pub decided_date: Option<NaiveDate>,
    /// More than one approval exists for the request.
    pub conflicting: bool,
}

/// The decision that determines the status: latest `decided_date`, ties going
/// to the lowest id (the first one stored). Input order does not matter.
pub fn effective_decision<'a, I>(approvals: I) -> Option<&'a Approval>
where
    I: IntoIterator<Item = &'a Approval>,
{
    approvals.into_iter().fold(None, |best: Option<&Approval>, candidate| match best {
        Some(current)
            if (current.decided_date, std::cmp::Reverse(current.id))
                >= (candidate.decided_date, std::cmp::Reverse(candidate.id)) =>
        {
            Some(current)
        }
        _ => Some(candidate),
    })
}

pub fn derive(approvals: &[Approval]) -> DerivedStatus {
    match effective_decision(approvals) {
        None => DerivedStatus {
            status: PermissionStatus::Pending,
            decided_date: None,
            conflicting: false,
        },
        Some(approval) => DerivedStatus {
            status: approval.outcome.into(),
            decided_date: Some(approval.decided_date),
            conflicting: approvals.len() > 1,
        },
    }
}
