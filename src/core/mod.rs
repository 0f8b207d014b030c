pub mod completion;
pub mod prompt;
pub mod router;
pub mod sanitize;
pub mod sessions;
pub mod traits;
