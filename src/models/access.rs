//! Role predicates and the access policies guarding every gated route.
//!
//! A policy is evaluated in a fixed order: the login gate first, then the
//! authorization gate. Anonymous requests are always redirected to login,
//! even on routes no session could pass.

use super::{
    permission::Permission,
    user::{Role, UserClaims},
};

/// Identity behind a request
#[derive(Debug, Clone)]
pub enum Principal {
    Anonymous,
    User(UserClaims),
}

impl Principal {
    pub fn claims(&self) -> Option<&UserClaims> {
        match self {
            Principal::Anonymous => None,
            Principal::User(claims) => Some(claims),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }
}

/// True when the principal's profile role equals `role`.
///
/// Anonymous principals and users without a profile never match.
pub fn has_role(principal: &Principal, role: Role) -> bool {
    principal.claims().and_then(|c| c.role) == Some(role)
}

pub fn is_admin(principal: &Principal) -> bool {
    has_role(principal, Role::Admin)
}

pub fn is_librarian(principal: &Principal) -> bool {
    has_role(principal, Role::Librarian)
}

pub fn is_member(principal: &Principal) -> bool {
    has_role(principal, Role::Member)
}

/// One way of passing the authorization gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Role(Role),
    Permission(Permission),
}

impl Requirement {
    fn is_met_by(&self, principal: &Principal) -> bool {
        match self {
            Requirement::Role(role) => has_role(principal, *role),
            Requirement::Permission(permission) => principal
                .claims()
                .map(|c| c.has_perm(*permission))
                .unwrap_or(false),
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Role(role) => write!(f, "role {}", role),
            Requirement::Permission(permission) => write!(f, "permission {}", permission),
        }
    }
}

/// Outcome of a guard chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    Forbidden(String),
}

/// Login gate plus an any-of authorization gate
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    any_of: &'static [Requirement],
}

impl AccessPolicy {
    /// Any authenticated user passes
    pub const fn login_required() -> Self {
        Self { any_of: &[] }
    }

    /// Authenticated users meeting at least one requirement pass
    pub const fn any_of(requirements: &'static [Requirement]) -> Self {
        Self { any_of: requirements }
    }

    pub fn evaluate(&self, principal: &Principal) -> Decision {
        if !principal.is_authenticated() {
            return Decision::RedirectToLogin;
        }
        if self.any_of.is_empty() || self.any_of.iter().any(|r| r.is_met_by(principal)) {
            return Decision::Allow;
        }
        let wanted: Vec<String> = self.any_of.iter().map(ToString::to_string).collect();
        Decision::Forbidden(format!("Requires {}", wanted.join(" or ")))
    }
}

pub mod policies {
    //! Policies of the gated routes

    use super::{AccessPolicy, Permission, Requirement, Role};

    pub const LOGIN: AccessPolicy = AccessPolicy::login_required();

    pub const ADMIN_DASHBOARD: AccessPolicy = AccessPolicy::any_of(&[Requirement::Role(Role::Admin)]);
    pub const LIBRARIAN_DASHBOARD: AccessPolicy =
        AccessPolicy::any_of(&[Requirement::Role(Role::Librarian)]);
    pub const MEMBER_DASHBOARD: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Role(Role::Member),
        Requirement::Permission(Permission::View),
    ]);

    pub const ADD_BOOK: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::AddBook),
        Requirement::Permission(Permission::Create),
        Requirement::Role(Role::Librarian),
        Requirement::Role(Role::Admin),
    ]);
    pub const EDIT_BOOK: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::ChangeBook),
        Requirement::Permission(Permission::Edit),
        Requirement::Role(Role::Librarian),
        Requirement::Role(Role::Admin),
    ]);
    pub const DELETE_BOOK: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::DeleteBook),
        Requirement::Permission(Permission::Delete),
        Requirement::Role(Role::Admin),
    ]);

    pub const AUTHOR_DIRECTORY: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::ViewAuthor),
        Requirement::Role(Role::Librarian),
        Requirement::Role(Role::Admin),
    ]);
    pub const CREATE_AUTHOR: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::CreateAuthor),
        Requirement::Role(Role::Admin),
    ]);
    pub const EDIT_AUTHOR: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::EditAuthor),
        Requirement::Role(Role::Admin),
    ]);
    pub const DELETE_AUTHOR: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::DeleteAuthor),
        Requirement::Role(Role::Admin),
    ]);

    pub const LIBRARY_DIRECTORY: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::ViewLibrary),
        Requirement::Role(Role::Librarian),
        Requirement::Role(Role::Admin),
    ]);
    pub const CREATE_LIBRARY: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::CreateLibrary),
        Requirement::Role(Role::Admin),
    ]);
    pub const EDIT_LIBRARY: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::EditLibrary),
        Requirement::Role(Role::Librarian),
        Requirement::Role(Role::Admin),
    ]);
    pub const DELETE_LIBRARY: AccessPolicy = AccessPolicy::any_of(&[
        Requirement::Permission(Permission::DeleteLibrary),
        Requirement::Role(Role::Admin),
    ]);

    pub const MANAGE_USERS: AccessPolicy = AccessPolicy::any_of(&[Requirement::Role(Role::Admin)]);
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{policies::*, *};

    fn session(role: Option<Role>, permissions: &[Permission]) -> Principal {
        Principal::User(UserClaims {
            sub: "someone".to_string(),
            user_id: 1,
            email: "someone@example.org".to_string(),
            role,
            permissions: permissions.iter().copied().collect::<BTreeSet<_>>(),
            is_superuser: false,
            full_name: "someone@example.org".to_string(),
            jti: "jti".to_string(),
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn predicates_are_false_for_anonymous_and_profile_less_users() {
        for principal in [Principal::Anonymous, session(None, &[])] {
            assert!(!is_admin(&principal));
            assert!(!is_librarian(&principal));
            assert!(!is_member(&principal));
        }
    }

    #[test]
    fn predicates_match_exactly_one_role() {
        let librarian = session(Some(Role::Librarian), &[]);
        assert!(is_librarian(&librarian));
        assert!(!is_admin(&librarian));
        assert!(!is_member(&librarian));
    }

    #[test]
    fn anonymous_is_redirected_before_authorization() {
        assert_eq!(ADD_BOOK.evaluate(&Principal::Anonymous), Decision::RedirectToLogin);
        assert_eq!(LOGIN.evaluate(&Principal::Anonymous), Decision::RedirectToLogin);
    }

    #[test]
    fn login_only_policy_admits_any_session() {
        assert_eq!(LOGIN.evaluate(&session(None, &[])), Decision::Allow);
    }

    #[test]
    fn permission_or_role_passes_the_book_gates() {
        let editor = session(Some(Role::Member), &[Permission::AddBook]);
        assert_eq!(ADD_BOOK.evaluate(&editor), Decision::Allow);
        assert!(matches!(EDIT_BOOK.evaluate(&editor), Decision::Forbidden(_)));

        let librarian = session(Some(Role::Librarian), &[]);
        assert_eq!(EDIT_BOOK.evaluate(&librarian), Decision::Allow);
        assert!(matches!(DELETE_BOOK.evaluate(&librarian), Decision::Forbidden(_)));
    }

    #[test]
    fn generic_grants_open_the_matching_gates() {
        let creator = session(Some(Role::Member), &[Permission::Create]);
        assert_eq!(ADD_BOOK.evaluate(&creator), Decision::Allow);

        let editor = session(Some(Role::Member), &[Permission::Edit]);
        assert_eq!(EDIT_BOOK.evaluate(&editor), Decision::Allow);
        assert!(matches!(DELETE_BOOK.evaluate(&editor), Decision::Forbidden(_)));

        let remover = session(None, &[Permission::Delete]);
        assert_eq!(DELETE_BOOK.evaluate(&remover), Decision::Allow);

        let viewer = session(None, &[Permission::View]);
        assert_eq!(MEMBER_DASHBOARD.evaluate(&viewer), Decision::Allow);
    }

    #[test]
    fn directory_and_author_edit_grants() {
        let member = session(Some(Role::Member), &[]);
        assert!(matches!(AUTHOR_DIRECTORY.evaluate(&member), Decision::Forbidden(_)));
        assert!(matches!(LIBRARY_DIRECTORY.evaluate(&member), Decision::Forbidden(_)));

        let reader = session(Some(Role::Member), &[Permission::ViewAuthor, Permission::ViewLibrary]);
        assert_eq!(AUTHOR_DIRECTORY.evaluate(&reader), Decision::Allow);
        assert_eq!(LIBRARY_DIRECTORY.evaluate(&reader), Decision::Allow);

        let librarian = session(Some(Role::Librarian), &[]);
        assert_eq!(AUTHOR_DIRECTORY.evaluate(&librarian), Decision::Allow);
        assert!(matches!(EDIT_AUTHOR.evaluate(&librarian), Decision::Forbidden(_)));

        let renamer = session(Some(Role::Member), &[Permission::EditAuthor]);
        assert_eq!(EDIT_AUTHOR.evaluate(&renamer), Decision::Allow);
    }

    #[test]
    fn forbidden_names_the_missing_requirements() {
        let member = session(Some(Role::Member), &[]);
        assert_eq!(
            DELETE_BOOK.evaluate(&member),
            Decision::Forbidden("Requires permission catalog.can_delete_book or permission catalog.can_delete or role Admin".to_string())
        );
    }

    #[test]
    fn superuser_passes_permission_gates_but_not_role_dashboards() {
        let mut claims = match session(None, &[]) {
            Principal::User(claims) => claims,
            Principal::Anonymous => unreachable!(),
        };
        claims.is_superuser = true;
        let root = Principal::User(claims);

        assert_eq!(DELETE_LIBRARY.evaluate(&root), Decision::Allow);
        assert!(matches!(LIBRARIAN_DASHBOARD.evaluate(&root), Decision::Forbidden(_)));
    }
}
