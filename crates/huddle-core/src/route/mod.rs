//! Route tree and path matching

pub mod matcher;
pub mod tree;

pub use matcher::{match_path, split_path, MatchedRoute, Params};
pub use tree::{RouteNode, RouteTree, Segment};
