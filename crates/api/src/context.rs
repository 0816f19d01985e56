use stockledger_auth::Role;
use stockledger_core::ActorId;
use stockledger_store::ActorRecord;

/// Authenticated actor for a request.
///
/// This is immutable and must be present for all ledger routes. It is built
/// from verified token claims by the auth middleware — handlers never read
/// identity from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor_id: ActorId,
    name: String,
    email: String,
    roles: Vec<Role>,
}

impl ActorContext {
    pub fn new(actor_id: ActorId, name: String, email: String, roles: Vec<Role>) -> Self {
        Self {
            actor_id,
            name,
            email,
            roles,
        }
    }

    pub fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }

    /// Directory record persisted alongside ledger writes so reads can join
    /// actor display fields.
    pub fn to_record(&self) -> ActorRecord {
        ActorRecord {
            id: self.actor_id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
