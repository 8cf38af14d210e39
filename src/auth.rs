use crate::model::{Role, User};

// Fixed credential pair for the admin account. This is a convenience gate
// for a single-user tool, not a security boundary.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "0000";

/// Teacher ids (and teacher usernames) carry this prefix.
pub const TEACHER_ID_PREFIX: &str = "T";

/// Stateless credential check.
///
/// The admin pair yields the admin identity; any username with the teacher
/// prefix and a non-empty password yields a teacher identity bound to that
/// teacher id; everything else is rejected.
pub fn authenticate(username: &str, password: &str) -> Option<User> {
    if username == ADMIN_USERNAME && password == ADMIN_PASSWORD {
        return Some(User {
            username: "Administrator".to_string(),
            role: Role::Admin,
            teacher_id: None,
        });
    }
    if username.starts_with(TEACHER_ID_PREFIX) && !password.is_empty() {
        return Some(User {
            username: format!("Teacher {}", username),
            role: Role::Teacher,
            teacher_id: Some(username.to_string()),
        });
    }
    None
}
