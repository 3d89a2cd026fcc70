pub mod account_service;
pub use account_service::{AccountError, AccountService, AccountSummary, ListFilter, Requester};

pub mod account_service_impl;
pub use account_service_impl::SeaOrmAccountService;
