pub mod config;
pub mod crawler;
pub mod link_graph;
pub mod output;
