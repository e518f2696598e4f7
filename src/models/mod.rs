//! Data models for Athenaeum

pub mod access;
pub mod author;
pub mod book;
pub mod library;
pub mod permission;
pub mod user;

// Re-export commonly used types
pub use access::{AccessPolicy, Decision, Principal};
pub use author::Author;
pub use book::{Book, BookForm};
pub use library::{EntityRef, Librarian, Library};
pub use permission::Permission;
pub use user::{Role, User, UserClaims, UserProfile};
