pub mod appointment_queries;
pub mod course_queries;
pub mod payment_queries;
pub mod review_queries;
pub mod service_queries;
pub mod user_queries;
pub mod working_hours_queries;
