pub mod auto_link;
pub mod catalog;
pub mod query;
pub mod resolver;
pub mod scoper;
pub mod service;
