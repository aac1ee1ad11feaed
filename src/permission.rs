//! Static role to permission mapping
//!
//! One table decides what every role may do. Call sites never re-derive
//! role checks; they ask [`can`] and nothing else.
use crate::actor::{Actor, Role};
use crate::cash_call::CashCallStatus;

/// Operations a role can be granted. Transitions are granted per
/// `from -> to` pair, never wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadAll,
    ReadOwn,
    Create,
    CreateOwnOnly,
    Transition {
        from: CashCallStatus,
        to: CashCallStatus,
    },
    BulkTransition,
    Delete,
    AdminOverride,
    ManageUsers,
    ManageAffiliates,
}

/// Pure and total: answers for every role/permission pair, never errors.
pub fn can(actor: &Actor, permission: Permission) -> bool {
    role_allows(actor.role, permission)
}

fn role_allows(role: Role, permission: Permission) -> bool {
    use CashCallStatus::*;
    use Permission::*;

    match role {
        Role::Admin => true,
        Role::Approver => matches!(
            permission,
            ReadAll
                | Transition {
                    from: UnderReview,
                    to: Approved,
                }
                | Transition {
                    from: UnderReview,
                    to: Rejected,
                }
                | Transition {
                    from: Approved,
                    to: Paid,
                }
        ),
        Role::Affiliate => matches!(
            permission,
            ReadOwn
                | CreateOwnOnly
                | Transition {
                    from: Draft,
                    to: UnderReview,
                }
        ),
        Role::Viewer => matches!(permission, ReadAll),
    }
}

const STATUSES: [CashCallStatus; 5] = [
    CashCallStatus::Draft,
    CashCallStatus::UnderReview,
    CashCallStatus::Approved,
    CashCallStatus::Rejected,
    CashCallStatus::Paid,
];

/// Whether the role holds any transition grant at all. Roles without one
/// (viewer) are turned away before workflow legality is even considered, so
/// they always see a plain denial.
pub fn can_transition_at_all(role: Role) -> bool {
    STATUSES.iter().any(|&from| {
        STATUSES
            .iter()
            .any(|&to| role_allows(role, Permission::Transition { from, to }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_operation() {
        let admin = Actor::new("user_1admin", Role::Admin);
        assert!(can(&admin, Permission::ManageUsers));
        assert!(can(&admin, Permission::Delete));
        assert!(can(
            &admin,
            Permission::Transition {
                from: CashCallStatus::Draft,
                to: CashCallStatus::UnderReview,
            }
        ));
    }

    #[test]
    fn approver_grants() {
        let approver = Actor::new("user_1appr", Role::Approver);
        assert!(can(&approver, Permission::ReadAll));
        assert!(can(
            &approver,
            Permission::Transition {
                from: CashCallStatus::UnderReview,
                to: CashCallStatus::Approved,
            }
        ));
        assert!(can(
            &approver,
            Permission::Transition {
                from: CashCallStatus::Approved,
                to: CashCallStatus::Paid,
            }
        ));
        assert!(!can(&approver, Permission::Create));
        assert!(!can(&approver, Permission::Delete));
        assert!(!can(
            &approver,
            Permission::Transition {
                from: CashCallStatus::Draft,
                to: CashCallStatus::UnderReview,
            }
        ));
    }

    #[test]
    fn affiliate_can_only_submit_its_own() {
        let affiliate = Actor::affiliate("user_1affl", "aff_1xyz");
        assert!(can(&affiliate, Permission::ReadOwn));
        assert!(can(&affiliate, Permission::CreateOwnOnly));
        assert!(can(
            &affiliate,
            Permission::Transition {
                from: CashCallStatus::Draft,
                to: CashCallStatus::UnderReview,
            }
        ));
        assert!(!can(&affiliate, Permission::ReadAll));
        assert!(!can(
            &affiliate,
            Permission::Transition {
                from: CashCallStatus::UnderReview,
                to: CashCallStatus::Approved,
            }
        ));
    }

    #[test]
    fn viewer_has_no_mutations() {
        let viewer = Actor::new("user_1view", Role::Viewer);
        assert!(can(&viewer, Permission::ReadAll));
        assert!(!can(&viewer, Permission::Create));
        assert!(!can(&viewer, Permission::Delete));
        assert!(!can_transition_at_all(Role::Viewer));
        assert!(can_transition_at_all(Role::Approver));
        assert!(can_transition_at_all(Role::Affiliate));
    }
}
