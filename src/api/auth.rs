//! Bearer-token check, applied before any other request validation (spec
//! §6.1, §4.6). Ground: `original_source/manager/auth.go`'s `HandleAuth`,
//! which compared the body's `token` field against the configured root
//! token before doing anything else.

use crate::domain::errors::{ControllerError, ControllerResult};

pub fn check_token(configured: &str, presented: &str) -> ControllerResult<()> {
    if presented == configured {
        Ok(())
    } else {
        Err(ControllerError::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_token_is_accepted() {
        assert!(check_token("secret", "secret").is_ok());
    }

    #[test]
    fn mismatched_token_is_rejected() {
        assert!(matches!(check_token("secret", "wrong"), Err(ControllerError::Auth)));
    }
}
