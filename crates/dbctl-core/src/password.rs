//! Database password rules shared by create, link, and reset

use crate::error::{CoreError, Result};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Characters the control plane refuses in database passwords
pub const FORBIDDEN_CHARS: [char; 5] = ['/', '"', '@', '\'', ' '];

/// Check a database password before it is sent anywhere.
///
/// Length is counted in characters, not bytes.
pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Invalid database password: must contain at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Invalid database password: must contain at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    if let Some(c) = password.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        let shown = if c == ' ' { "space".to_string() } else { format!("'{}'", c) };
        return Err(CoreError::Validation(format!(
            "Invalid database password: {} is not allowed. Do not use / \" @ ' or spaces",
            shown
        )));
    }
    Ok(())
}
