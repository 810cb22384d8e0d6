use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{HuddleError, Result};
use crate::route::tree::{RouteNode, RouteTree, Segment};

/// Path parameters bound by dynamic segments, keyed by parameter name
pub type Params = BTreeMap<String, String>;

/// One route of a matched chain together with the parameters it bound
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    pub node: Arc<RouteNode>,
    /// Parameters bound by this route's own segment (empty for static routes)
    pub params: Params,
}

/// Split a path into its non-empty segments
///
/// Leading, trailing and repeated slashes carry no meaning.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match `path` against the tree, root to leaf
///
/// Every path segment must be consumed. At each level a static child whose
/// literal equals the segment wins; otherwise the (single) dynamic child binds
/// the segment. There is no backtracking.
///
/// # Errors
///
/// Returns `RouteNotFound` if the path is empty or any segment is unmatched.
pub fn match_path(tree: &RouteTree, path: &str) -> Result<Vec<MatchedRoute>> {
    let segments = split_path(path);
    if segments.is_empty() {
        return Err(not_found(path));
    }

    let mut chain = Vec::with_capacity(segments.len());
    let mut level: &[Arc<RouteNode>] = tree.roots();

    for segment in segments {
        let node = select_child(level, segment).ok_or_else(|| not_found(path))?;

        let mut params = Params::new();
        if let Segment::Param(name) = node.segment() {
            params.insert(name.clone(), segment.to_string());
        }

        chain.push(MatchedRoute {
            node: Arc::clone(node),
            params,
        });
        level = node.children();
    }

    Ok(chain)
}

fn select_child<'a>(level: &'a [Arc<RouteNode>], segment: &str) -> Option<&'a Arc<RouteNode>> {
    level
        .iter()
        .find(|n| matches!(n.segment(), Segment::Static(lit) if lit == segment))
        .or_else(|| {
            level
                .iter()
                .find(|n| matches!(n.segment(), Segment::Param(_)))
        })
}

fn not_found(path: &str) -> HuddleError {
    HuddleError::RouteNotFound {
        path: path.to_string(),
    }
}
