pub mod check;
pub mod demo;
pub mod grade;
pub mod init;
pub mod schema;
pub mod template;
