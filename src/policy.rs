//! Access rules for every catalog and result operation, kept in one place
//! so the matrix is independently testable. Evaluated on each call; nothing
//! here is cached across requests.

use crate::domain::models::Identity;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Pillar,
    Question,
    DiagnosticResult { owner: Uuid },
    Settings,
}

/// Authorization rejection. "Does not exist" and "exists but not yours" are
/// deliberately the same variant so callers can never probe for existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("caller is not authenticated")]
    NotAuthenticated,
    #[error("not found")]
    NotFoundOrForbidden,
}

/// Resolve the caller to a user id, rejecting anonymous callers before any
/// scoring or persistence work happens.
pub fn require_user(identity: &Identity) -> Result<Uuid, AccessError> {
    identity.user_id().ok_or(AccessError::NotAuthenticated)
}

pub fn authorize(identity: &Identity, action: Action, resource: Resource) -> Result<(), AccessError> {
    match resource {
        // Branding assets are public to read; changing them takes a session.
        Resource::Settings => match action {
            Action::Read => Ok(()),
            Action::Update => require_user(identity).map(|_| ()),
            Action::Create | Action::Delete => Err(AccessError::NotFoundOrForbidden),
        },

        // Catalog rows have no per-row owner; any authenticated caller may
        // manage them, except pillar deletion which is admin-gated (it
        // cascades over the pillar's questions).
        Resource::Pillar if action == Action::Delete => {
            require_user(identity)?;
            if identity.is_admin() {
                Ok(())
            } else {
                Err(AccessError::NotFoundOrForbidden)
            }
        }
        Resource::Pillar | Resource::Question => require_user(identity).map(|_| ()),

        // Results are strictly owner-scoped, and immutable once written.
        Resource::DiagnosticResult { owner } => {
            let caller = require_user(identity)?;
            if action == Action::Update {
                return Err(AccessError::NotFoundOrForbidden);
            }
            if caller == owner {
                Ok(())
            } else {
                Err(AccessError::NotFoundOrForbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Role;

    fn member() -> Identity {
        Identity::User {
            id: Uuid::new_v4(),
            role: Role::Member,
        }
    }

    fn admin() -> Identity {
        Identity::User {
            id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    #[test]
    fn anonymous_is_rejected_everywhere_except_settings_read() {
        let anon = Identity::Anonymous;
        assert_eq!(authorize(&anon, Action::Read, Resource::Settings), Ok(()));

        for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
            assert_eq!(
                authorize(&anon, action, Resource::Pillar),
                Err(AccessError::NotAuthenticated)
            );
            assert_eq!(
                authorize(
                    &anon,
                    action,
                    Resource::DiagnosticResult {
                        owner: Uuid::new_v4()
                    }
                ),
                Err(AccessError::NotAuthenticated)
            );
        }
    }

    #[test]
    fn members_manage_the_catalog_but_cannot_delete_pillars() {
        let caller = member();
        assert_eq!(authorize(&caller, Action::Read, Resource::Pillar), Ok(()));
        assert_eq!(authorize(&caller, Action::Create, Resource::Pillar), Ok(()));
        assert_eq!(authorize(&caller, Action::Update, Resource::Question), Ok(()));
        assert_eq!(authorize(&caller, Action::Delete, Resource::Question), Ok(()));
        assert_eq!(
            authorize(&caller, Action::Delete, Resource::Pillar),
            Err(AccessError::NotFoundOrForbidden)
        );
        assert_eq!(authorize(&admin(), Action::Delete, Resource::Pillar), Ok(()));
    }

    #[test]
    fn results_are_owner_scoped() {
        let caller = member();
        let owner = caller.user_id().unwrap();

        assert_eq!(
            authorize(&caller, Action::Read, Resource::DiagnosticResult { owner }),
            Ok(())
        );
        assert_eq!(
            authorize(&caller, Action::Delete, Resource::DiagnosticResult { owner }),
            Ok(())
        );

        let foreign = Resource::DiagnosticResult {
            owner: Uuid::new_v4(),
        };
        assert_eq!(
            authorize(&caller, Action::Read, foreign),
            Err(AccessError::NotFoundOrForbidden)
        );
        assert_eq!(
            authorize(&caller, Action::Delete, foreign),
            Err(AccessError::NotFoundOrForbidden)
        );
        // Admins get no special access to other people's results.
        assert_eq!(
            authorize(&admin(), Action::Read, foreign),
            Err(AccessError::NotFoundOrForbidden)
        );
    }

    #[test]
    fn results_are_immutable_even_for_their_owner() {
        let caller = member();
        let owner = caller.user_id().unwrap();
        assert_eq!(
            authorize(&caller, Action::Update, Resource::DiagnosticResult { owner }),
            Err(AccessError::NotFoundOrForbidden)
        );
    }

    #[test]
    fn settings_updates_take_any_session() {
        assert_eq!(authorize(&member(), Action::Update, Resource::Settings), Ok(()));
        assert_eq!(
            authorize(&Identity::Anonymous, Action::Update, Resource::Settings),
            Err(AccessError::NotAuthenticated)
        );
        assert_eq!(
            authorize(&member(), Action::Delete, Resource::Settings),
            Err(AccessError::NotFoundOrForbidden)
        );
    }
}
