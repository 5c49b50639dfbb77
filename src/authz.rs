use std::fmt;

/// Protected resource kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resource {
    Post,
    User,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    Read,
    Update,
    Delete,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Post => write!(f, "post"),
            Resource::User => write!(f, "user"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Decision {
    Allow,
    Deny(String),
}

/// The whole access policy, spelled out so a reviewer can see every
/// protected operation in one place. A resource/operation pair absent from
/// this table needs no ownership (reads are public).
///
/// For `User` the owner id is the user's own id, so only the account holder
/// can delete it. There is no admin bypass, and none may be added.
const OWNERSHIP_RULES: &[(Resource, &[Operation])] = &[
    (Resource::Post, &[Operation::Update, Operation::Delete]),
    (Resource::User, &[Operation::Delete]),
];

fn requires_ownership(resource: Resource, operation: Operation) -> bool {
    OWNERSHIP_RULES
        .iter()
        .any(|(r, ops)| *r == resource && ops.contains(&operation))
}

/// Decide whether `actor_id` may perform `operation` on the resource owned
/// by `owner_id`. Pure; the caller loads the owner id and translates
/// `Deny` into a 403.
pub fn authorize(
    actor_id: &str,
    owner_id: &str,
    resource: Resource,
    operation: Operation,
) -> Decision {
    if !requires_ownership(resource, operation) {
        return Decision::Allow;
    }
    if actor_id == owner_id {
        Decision::Allow
    } else {
        Decision::Deny(format!("Not authorised to {} this {}", operation, resource))
    }
}
