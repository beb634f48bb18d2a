mod common;
mod search_repository_tests;
