use uuid::Uuid;

/// Placeholder identity used when no real session exists.
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_00000000d3e0);
pub const DEMO_USER_EMAIL: &str = "demo@qrtrail.local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Who a scan-history call acts for. Passed explicitly into every
/// repository operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// Backed entirely by the local cache.
    Demo,
    /// Backed by the remote store.
    User(Identity),
}

impl Session {
    /// A missing identity or the demo id both map to `Demo`.
    pub fn from_identity(identity: Option<Identity>) -> Self {
        match identity {
            Some(id) if id.user_id != DEMO_USER_ID => Session::User(id),
            _ => Session::Demo,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Session::Demo)
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Session::Demo => DEMO_USER_ID,
            Session::User(id) => id.user_id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Session::Demo => DEMO_USER_EMAIL,
            Session::User(id) => &id.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_identity_is_demo() {
        assert!(Session::from_identity(None).is_demo());
    }

    #[test]
    fn demo_id_is_normalized_to_demo() {
        let session = Session::from_identity(Some(Identity {
            user_id: DEMO_USER_ID,
            email: "someone@example.com".into(),
        }));
        assert_eq!(session, Session::Demo);
        assert_eq!(session.email(), DEMO_USER_EMAIL);
    }

    #[test]
    fn real_identity_is_user() {
        let user_id = Uuid::new_v4();
        let session = Session::from_identity(Some(Identity {
            user_id,
            email: "a@b.co".into(),
        }));
        assert!(!session.is_demo());
        assert_eq!(session.user_id(), user_id);
        assert_eq!(session.email(), "a@b.co");
    }
}
