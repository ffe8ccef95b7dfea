mod analytics_tests;
mod pricing_tests;
