pub mod cv_upload;
pub mod handlers;
pub mod store;
