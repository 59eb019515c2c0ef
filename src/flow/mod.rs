pub mod description;
pub mod dispatch;
pub mod notification;
pub mod redirect;
pub mod submission;
