//! Role names and the capability mapping.
//!
//! Authorization is evaluated per-operation from the caller's role and the
//! master-account flag; nothing is cached between operations.

/// Unit owner. May submit requests, resubmit their own rejected requests,
/// post messages on their own requests, and read their own requests.
pub const ROLE_RESIDENT: &str = "resident";

/// Building administration staff.
pub const ROLE_ADMINISTRATOR: &str = "administrator";

/// Engineering staff; the audience for inspection-request notifications.
pub const ROLE_ENGINEERING: &str = "engineering";

/// Superuser role.
pub const ROLE_DEVELOPER: &str = "developer";

/// All role names accepted from the identity provider.
pub const VALID_ROLES: &[&str] = &[
    ROLE_RESIDENT,
    ROLE_ADMINISTRATOR,
    ROLE_ENGINEERING,
    ROLE_DEVELOPER,
];

/// Returns `true` if the role string is one of the known roles.
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

/// The `ReviewRequests` capability: move requests through the lifecycle,
/// manage inspections, and read every request.
///
/// Held by administrators, engineering, developers, and any account the
/// identity provider flags as a master (non-resident) account.
pub fn can_review_requests(role: &str, is_master: bool) -> bool {
    is_master || matches!(role, ROLE_ADMINISTRATOR | ROLE_ENGINEERING | ROLE_DEVELOPER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles_hold_review_capability() {
        assert!(can_review_requests(ROLE_ADMINISTRATOR, false));
        assert!(can_review_requests(ROLE_ENGINEERING, false));
        assert!(can_review_requests(ROLE_DEVELOPER, false));
    }

    #[test]
    fn resident_lacks_review_capability() {
        assert!(!can_review_requests(ROLE_RESIDENT, false));
    }

    #[test]
    fn master_flag_grants_review_capability_regardless_of_role() {
        assert!(can_review_requests(ROLE_RESIDENT, true));
        assert!(can_review_requests("something-else", true));
    }

    #[test]
    fn unknown_role_without_master_flag_is_denied() {
        assert!(!can_review_requests("janitor", false));
        assert!(!can_review_requests("", false));
    }

    #[test]
    fn role_validation() {
        assert!(is_valid_role("resident"));
        assert!(is_valid_role("developer"));
        assert!(!is_valid_role("Resident"));
        assert!(!is_valid_role(""));
    }
}
