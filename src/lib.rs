pub mod andersen;
pub mod call_graph;
pub mod cha;
pub mod config;
pub mod hierarchy;
pub mod ir;
pub mod parse;
