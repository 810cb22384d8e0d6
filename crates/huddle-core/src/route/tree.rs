use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::errors::{HuddleError, Result};
use crate::hooks::{GuardHook, ModelHook};

/// One path segment pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the path segment literally
    Static(String),
    /// Matches any single path segment and binds it under this name
    Param(String),
}

impl Segment {
    /// Parse `":teamId"` as a parameter and anything else as a literal
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Static(pattern.to_string()),
        }
    }

    /// Parameter name, if this segment is dynamic
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Param(name) => Some(name),
            Segment::Static(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(literal) => f.write_str(literal),
            Segment::Param(name) => write!(f, ":{}", name),
        }
    }
}

/// A navigable route segment and its nested routes
///
/// Data only: behaviour is attached through the optional guard and model
/// hooks, which the resolver invokes. Built top-down with the `with_*`
/// methods and frozen once handed to [`RouteTree::new`].
#[derive(Clone)]
pub struct RouteNode {
    name: String,
    segment: Segment,
    children: Vec<Arc<RouteNode>>,
    guard: Option<Arc<dyn GuardHook>>,
    model: Option<Arc<dyn ModelHook>>,
}

impl RouteNode {
    /// Create a route named `name` matching `pattern` (`"teams"` or `":teamId"`)
    pub fn new(name: impl Into<String>, pattern: &str) -> Self {
        Self {
            name: name.into(),
            segment: Segment::parse(pattern),
            children: Vec::new(),
            guard: None,
            model: None,
        }
    }

    /// Attach the guard run before this route's model
    pub fn with_guard(mut self, guard: Arc<dyn GuardHook>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attach the data-loading hook for this route
    pub fn with_model(mut self, model: Arc<dyn ModelHook>) -> Self {
        self.model = Some(model);
        self
    }

    /// Nest a child route
    pub fn with_child(mut self, child: RouteNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn param_name(&self) -> Option<&str> {
        self.segment.param_name()
    }

    pub fn children(&self) -> &[Arc<RouteNode>] {
        &self.children
    }

    pub fn guard(&self) -> Option<&Arc<dyn GuardHook>> {
        self.guard.as_ref()
    }

    pub fn model(&self) -> Option<&Arc<dyn ModelHook>> {
        self.model.as_ref()
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("name", &self.name)
            .field("segment", &self.segment)
            .field("guard", &self.guard.is_some())
            .field("model", &self.model.is_some())
            .field("children", &self.children)
            .finish()
    }
}

/// Immutable set of top-level routes
///
/// The root itself is implicit and carries no hooks; `navigate("/teams")`
/// matches the top-level route `teams` at depth 0.
#[derive(Debug, Clone)]
pub struct RouteTree {
    roots: Vec<Arc<RouteNode>>,
}

impl RouteTree {
    /// Validate and freeze a set of top-level routes
    ///
    /// # Errors
    ///
    /// Returns `InvalidRouteTree` if any sibling group has duplicate names,
    /// duplicate static segments or more than one dynamic segment, or if a
    /// segment is empty or contains `/`.
    pub fn new(roots: Vec<RouteNode>) -> Result<Self> {
        let roots: Vec<Arc<RouteNode>> = roots.into_iter().map(Arc::new).collect();
        validate_siblings("<root>", &roots)?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[Arc<RouteNode>] {
        &self.roots
    }

    /// Every route as `(dotted name, path pattern)`, depth-first
    ///
    /// ```
    /// use huddle_core::route::{RouteNode, RouteTree};
    ///
    /// let tree = RouteTree::new(vec![
    ///     RouteNode::new("teams", "teams").with_child(RouteNode::new("team", ":teamId")),
    /// ])
    /// .unwrap();
    /// assert_eq!(
    ///     tree.patterns(),
    ///     vec![
    ///         ("teams".to_string(), "/teams".to_string()),
    ///         ("teams.team".to_string(), "/teams/:teamId".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn patterns(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect_patterns(root, "", "", &mut out);
        }
        out
    }
}

fn collect_patterns(
    node: &RouteNode,
    name_prefix: &str,
    path_prefix: &str,
    out: &mut Vec<(String, String)>,
) {
    let name = if name_prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{}.{}", name_prefix, node.name)
    };
    let path = format!("{}/{}", path_prefix, node.segment);
    out.push((name.clone(), path.clone()));
    for child in &node.children {
        collect_patterns(child, &name, &path, out);
    }
}

fn validate_siblings(parent: &str, siblings: &[Arc<RouteNode>]) -> Result<()> {
    let mut names = HashSet::new();
    let mut literals = HashSet::new();
    let mut dynamic: Option<&str> = None;

    for node in siblings {
        if node.name.is_empty() {
            return Err(invalid(format!("route under '{}' has an empty name", parent)));
        }
        if !names.insert(node.name.as_str()) {
            return Err(invalid(format!(
                "duplicate route name '{}' under '{}'",
                node.name, parent
            )));
        }
        match &node.segment {
            Segment::Static(literal) => {
                check_segment_text(&node.name, literal)?;
                if !literals.insert(literal.as_str()) {
                    return Err(invalid(format!(
                        "duplicate static segment '{}' under '{}'",
                        literal, parent
                    )));
                }
            }
            Segment::Param(param) => {
                check_segment_text(&node.name, param)?;
                if let Some(existing) = dynamic {
                    return Err(invalid(format!(
                        "'{}' has two dynamic children: '{}' and '{}'",
                        parent, existing, node.name
                    )));
                }
                dynamic = Some(node.name.as_str());
            }
        }
        validate_siblings(&node.name, &node.children)?;
    }
    Ok(())
}

fn check_segment_text(route: &str, text: &str) -> Result<()> {
    if text.is_empty() || text.contains('/') {
        return Err(invalid(format!(
            "route '{}' has invalid segment '{}'",
            route, text
        )));
    }
    Ok(())
}

fn invalid(reason: String) -> HuddleError {
    HuddleError::InvalidRouteTree { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse("teams"), Segment::Static("teams".to_string()));
        assert_eq!(Segment::parse(":teamId"), Segment::Param("teamId".to_string()));
        assert_eq!(Segment::parse(":teamId").to_string(), ":teamId");
    }

    #[test]
    fn test_two_dynamic_children_rejected() {
        let err = RouteTree::new(vec![RouteNode::new("teams", "teams")
            .with_child(RouteNode::new("team", ":teamId"))
            .with_child(RouteNode::new("other", ":otherId"))])
        .unwrap_err();

        assert!(matches!(err, HuddleError::InvalidRouteTree { .. }));
    }

    #[test]
    fn test_duplicate_static_segment_rejected() {
        let err = RouteTree::new(vec![
            RouteNode::new("teams", "teams"),
            RouteNode::new("teams-again", "teams"),
        ])
        .unwrap_err();

        assert!(matches!(err, HuddleError::InvalidRouteTree { .. }));
    }

    #[test]
    fn test_segment_with_slash_rejected() {
        assert!(RouteTree::new(vec![RouteNode::new("bad", "a/b")]).is_err());
        assert!(RouteTree::new(vec![RouteNode::new("empty", ":")]).is_err());
    }

    #[test]
    fn test_patterns_parent_before_children() {
        let tree = RouteTree::new(vec![
            RouteNode::new("login", "login"),
            RouteNode::new("teams", "teams").with_child(
                RouteNode::new("team", ":teamId").with_child(RouteNode::new("channel", ":channelId")),
            ),
        ])
        .unwrap();

        let names: Vec<String> = tree.patterns().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["login", "teams", "teams.team", "teams.team.channel"]
        );
        assert_eq!(tree.patterns()[3].1, "/teams/:teamId/:channelId");
    }
}
