pub mod graph;
pub mod search;
pub mod driver;
pub mod bruteforce;
