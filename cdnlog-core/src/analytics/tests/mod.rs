mod errors_tests;
mod query_tests;
