pub mod conversations;
pub mod messages;
pub mod presence;
pub mod reactions;
pub mod reads;
pub mod typing;
pub mod users;
