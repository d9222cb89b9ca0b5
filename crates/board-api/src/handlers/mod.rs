pub mod accounts;
pub mod comments;
pub mod engagement;
pub mod subjects;
