mod crawl_tests;
mod resolver_tests;
