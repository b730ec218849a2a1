mod auth_tests;
mod health_tests;
mod internal_tests;
mod request_tests;
