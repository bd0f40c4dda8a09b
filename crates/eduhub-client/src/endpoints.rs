//! Backend paths, relative to the configured API base URL.

use eduhub_common::UserId;

pub const AUTH_ME: &str = "/auth/me";
pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const USERS: &str = "/users";
pub const MESSAGES: &str = "/messages";

/// Message thread between the current user and `partner`.
pub fn conversation(partner: UserId) -> String {
    format!("{MESSAGES}/{partner}")
}
