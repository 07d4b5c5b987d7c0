//! End-to-end tests against a mocked tweedekamer.nl

mod crawl_tests;
mod fixtures;
mod load_tests;
