// Library for tests to access modules

pub mod config;
pub mod models;
pub mod pipeline;
pub mod prometheus;
pub mod routes;
pub mod snapshot;
pub mod table;
pub mod worker;
