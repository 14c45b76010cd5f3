pub mod link;
pub mod mailbox;
pub mod message;
pub mod protocol;
