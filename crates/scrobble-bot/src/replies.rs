//! User-facing wording for registry outcomes.

use lastfm_client::LastfmError;
use user_registry::RegistryError;

/// Short reply explaining why an operation did not go through.
pub fn describe_error(error: &RegistryError) -> String {
    match error {
        RegistryError::UserAlreadyRegistered => {
            "Your Last.fm account is already linked. Send !unregister first to link another.".into()
        }
        RegistryError::UserAlreadyInRegistrationProcess => {
            "You already have a registration in progress. Reply \"done\" once you've authorized, or !cancel.".into()
        }
        RegistryError::UserNotInRegistrationProcess => {
            "You have no registration in progress. Send !register to start.".into()
        }
        RegistryError::UserNotRegistered => {
            "You haven't linked a Last.fm account yet. Send !register to start.".into()
        }
        RegistryError::MismatchedScrobbleData { .. } => "Could not match those plays up.".into(),
        RegistryError::Lastfm(e) => describe_lastfm_error(e),
    }
}

fn describe_lastfm_error(error: &LastfmError) -> String {
    match error {
        LastfmError::ServiceUnavailable => {
            "Last.fm is unavailable right now, please try again in a few minutes.".into()
        }
        LastfmError::TokenNotAuthorized => {
            "Last.fm says the link was not authorized. Send !register to try again.".into()
        }
        LastfmError::SessionExpired => {
            "Last.fm rejected your session; access may have been revoked. Send !unregister, then !register.".into()
        }
        _ => "Something went wrong talking to Last.fm.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_suggests_retry() {
        let reply = describe_error(&RegistryError::Lastfm(LastfmError::ServiceUnavailable));
        assert!(reply.contains("try again"));
    }

    #[test]
    fn test_unknown_error_is_generic() {
        let reply = describe_error(&RegistryError::Lastfm(LastfmError::UnknownRequestError(
            "error 8: backend".into(),
        )));
        assert!(!reply.contains("backend"));
    }
}
