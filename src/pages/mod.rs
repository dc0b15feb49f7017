//! Page objects: locators plus domain actions, composed over
//! [`PageDriver`](crate::page::PageDriver)

pub mod google;

pub use google::GooglePage;
