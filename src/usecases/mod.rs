pub mod comments;
pub mod threads;
