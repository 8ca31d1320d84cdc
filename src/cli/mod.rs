pub mod auth;
pub mod output;
pub mod request;
pub mod status;
