//! Authorization decisions for operations on user records.
//!
//! A caller may act on a user record when it holds the administrative role,
//! or when it holds the customer role and has been granted the matching
//! capability for that exact record. The decision is recomputed for every
//! request from the subject passed in; nothing is cached.

use crate::error::{AppError, Result};
use crate::models::permission::{Capability, UserAction};
use crate::models::role::{ADMIN_ROLE, CUSTOMER_ROLE};
use crate::models::user::UserId;

/// Role and permission lookup for the current caller.
pub trait Authenticator {
    fn has_role(&self, role: &str) -> bool;

    fn is_permitted(&self, capability: &Capability) -> bool;
}

/// Stateless authorization predicate.
pub struct AccessGate;

impl AccessGate {
    /// True when `subject` may perform `action` on user `target`.
    pub fn may_act_on_user<A>(subject: &A, action: UserAction, target: UserId) -> bool
    where
        A: Authenticator + ?Sized,
    {
        subject.has_role(ADMIN_ROLE) || Self::is_customer_with_permission(subject, action, target)
    }

    fn is_customer_with_permission<A>(subject: &A, action: UserAction, target: UserId) -> bool
    where
        A: Authenticator + ?Sized,
    {
        let capability = Capability::new(action, target);
        let customer = subject.has_role(CUSTOMER_ROLE);
        let permitted = customer && subject.is_permitted(&capability);
        tracing::debug!(
            customer,
            permission = %capability,
            permitted,
            "Evaluated customer permission"
        );
        permitted
    }

    /// Fail with `Authorization` unless the subject is an administrator.
    pub fn require_admin<A>(subject: &A) -> Result<()>
    where
        A: Authenticator + ?Sized,
    {
        if subject.has_role(ADMIN_ROLE) {
            Ok(())
        } else {
            tracing::debug!("Operation not permitted: administrator role required");
            Err(AppError::Authorization("No Permission".to_string()))
        }
    }

    /// Fail with `Authorization` unless [`Self::may_act_on_user`] holds.
    pub fn require_user_action<A>(subject: &A, action: UserAction, target: UserId) -> Result<()>
    where
        A: Authenticator + ?Sized,
    {
        if Self::may_act_on_user(subject, action, target) {
            Ok(())
        } else {
            tracing::debug!(action = %action, target, "Operation not permitted");
            Err(AppError::Authorization("No Permission".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subject::Subject;

    fn admin() -> Subject {
        Subject::new(1, "admin").with_role(ADMIN_ROLE)
    }

    fn customer() -> Subject {
        Subject::new(42, "owner").with_role(CUSTOMER_ROLE)
    }

    #[test]
    fn test_admin_may_act_on_any_user() {
        let subject = admin();
        for action in UserAction::ALL {
            for target in [1, 42, 43, 9_999] {
                assert!(AccessGate::may_act_on_user(&subject, action, target));
            }
        }
    }

    #[test]
    fn test_customer_without_permission_is_denied() {
        let subject = customer();
        for action in UserAction::ALL {
            assert!(!AccessGate::may_act_on_user(&subject, action, 42));
        }
    }

    #[test]
    fn test_customer_permission_is_scoped_to_one_record() {
        let subject = customer().with_permission(Capability::new(UserAction::Update, 42));
        assert!(AccessGate::may_act_on_user(&subject, UserAction::Update, 42));
        assert!(!AccessGate::may_act_on_user(&subject, UserAction::Update, 43));
        assert!(!AccessGate::may_act_on_user(&subject, UserAction::Edit, 42));
    }

    #[test]
    fn test_permission_without_customer_role_is_denied() {
        let subject =
            Subject::new(42, "norole").with_permission(Capability::new(UserAction::Update, 42));
        assert!(!AccessGate::may_act_on_user(&subject, UserAction::Update, 42));
    }

    #[test]
    fn test_require_admin() {
        assert!(AccessGate::require_admin(&admin()).is_ok());
        let err = AccessGate::require_admin(&customer()).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_require_user_action() {
        let subject = customer().with_permission(Capability::new(UserAction::Edit, 42));
        assert!(AccessGate::require_user_action(&subject, UserAction::Edit, 42).is_ok());
        let err = AccessGate::require_user_action(&subject, UserAction::Edit, 99).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_works_through_trait_object() {
        let subject: Box<dyn Authenticator> = Box::new(admin());
        assert!(AccessGate::may_act_on_user(
            subject.as_ref(),
            UserAction::Update,
            7
        ));
    }
}
