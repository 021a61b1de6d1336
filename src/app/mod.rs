pub mod comments;
pub mod error;
pub mod posts;
pub mod relations;
pub mod validation;
