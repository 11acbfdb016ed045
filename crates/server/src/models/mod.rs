mod conversation;
mod message;
mod presence;
mod user;

pub use conversation::*;
pub use message::*;
pub use presence::*;
pub use user::*;

/// Subject id verified from the identity provider's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

/// Caller whose identity resolved to a registered user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
}
