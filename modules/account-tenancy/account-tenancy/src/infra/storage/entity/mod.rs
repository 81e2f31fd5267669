pub mod account;
pub mod account_membership;
