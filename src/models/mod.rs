pub mod comment;
pub mod deployment;
pub mod event;
pub mod pull_request;
pub mod ticket;
