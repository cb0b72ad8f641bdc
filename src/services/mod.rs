pub mod availability;
pub mod email_service;
pub mod storage_service;
pub mod stripe_service;
