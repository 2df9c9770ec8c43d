//! Route manifest: the pages, endpoints and param matchers of an app.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "component": "src/routes/+layout.svelte" },
//!     { "component": "src/routes/+page.svelte", "universal": "src/routes/+page.js" }
//!   ],
//!   "routes": [
//!     { "id": "/", "leaf": { "component": "src/routes/+page.svelte" } },
//!     { "id": "/api", "endpoint": "src/routes/api/+server.js" }
//!   ],
//!   "matchers": { "int": "src/params/int.js" }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

/// The file role a node entry plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Renders the page; loaded on demand.
    Component,
    /// Load logic that runs on both server and client; loaded on demand.
    ClientLogic,
    /// Server-only load logic and actions; imported eagerly.
    ServerLogic,
}

impl NodeRole {
    pub const ALL: [NodeRole; 3] = [
        NodeRole::Component,
        NodeRole::ClientLogic,
        NodeRole::ServerLogic,
    ];

    /// Whether the generated module wraps this role in a lazy loader.
    pub fn is_lazy(self) -> bool {
        !matches!(self, NodeRole::ServerLogic)
    }

    /// Name the role is exported under in a node module.
    pub fn export_name(self) -> &'static str {
        match self {
            NodeRole::Component => "component",
            NodeRole::ClientLogic => "universal",
            NodeRole::ServerLogic => "server",
        }
    }
}

/// One page node: a component plus optional load logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, rename = "universal", skip_serializing_if = "Option::is_none")]
    pub client_logic: Option<String>,
    #[serde(default, rename = "server", skip_serializing_if = "Option::is_none")]
    pub server_logic: Option<String>,
}

impl RouteNode {
    pub fn file(&self, role: NodeRole) -> Option<&str> {
        match role {
            NodeRole::Component => self.component.as_deref(),
            NodeRole::ClientLogic => self.client_logic.as_deref(),
            NodeRole::ServerLogic => self.server_logic.as_deref(),
        }
    }

    /// Present roles with their files, in component, client-logic,
    /// server-logic order.
    pub fn roles(&self) -> impl Iterator<Item = (NodeRole, &str)> {
        NodeRole::ALL
            .into_iter()
            .filter_map(move |role| self.file(role).map(|file| (role, file)))
    }
}

/// A route: an endpoint, a page leaf, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    #[serde(default, rename = "endpoint", skip_serializing_if = "Option::is_none")]
    pub endpoint_file: Option<String>,
    #[serde(default, rename = "leaf", skip_serializing_if = "Option::is_none")]
    pub node: Option<RouteNode>,
}

impl Route {
    /// Files whose exports can declare HTTP methods for this route.
    pub fn handler_files(&self) -> impl Iterator<Item = &str> {
        self.endpoint_file
            .as_deref()
            .into_iter()
            .chain(self.node.as_ref().and_then(|node| node.server_logic.as_deref()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Page nodes; a node's position is its index in generated output.
    #[serde(default)]
    pub nodes: Vec<RouteNode>,
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Matcher name -> source file.
    #[serde(default)]
    pub matchers: IndexMap<String, String>,
}

impl RouteManifest {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(GraphError::InvalidRouteManifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_manifest() {
        let manifest = RouteManifest::from_json(
            r#"{
                "nodes": [
                    { "component": "src/routes/+layout.svelte" },
                    { "component": "src/routes/+page.svelte", "server": "src/routes/+page.server.js" }
                ],
                "routes": [
                    { "id": "/", "leaf": { "server": "src/routes/+page.server.js" } },
                    { "id": "/api", "endpoint": "src/routes/api/+server.js" }
                ],
                "matchers": { "int": "src/params/int.js", "slug": "src/params/slug.js" }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.nodes.len(), 2);
        assert_eq!(
            manifest.nodes[1].server_logic.as_deref(),
            Some("src/routes/+page.server.js")
        );
        assert_eq!(
            manifest.matchers.keys().collect::<Vec<_>>(),
            ["int", "slug"]
        );
        assert_eq!(
            manifest.routes[0].handler_files().collect::<Vec<_>>(),
            ["src/routes/+page.server.js"]
        );
        assert_eq!(
            manifest.routes[1].handler_files().collect::<Vec<_>>(),
            ["src/routes/api/+server.js"]
        );
    }

    #[test]
    fn test_roles_follow_fixed_order() {
        let node = RouteNode {
            component: Some("c".into()),
            client_logic: None,
            server_logic: Some("s".into()),
        };
        let roles: Vec<_> = node.roles().collect();
        assert_eq!(
            roles,
            vec![(NodeRole::Component, "c"), (NodeRole::ServerLogic, "s")]
        );
        assert!(NodeRole::Component.is_lazy());
        assert!(NodeRole::ClientLogic.is_lazy());
        assert!(!NodeRole::ServerLogic.is_lazy());
    }

    #[test]
    fn test_invalid_route_manifest() {
        let err = RouteManifest::from_json(r#"{ "nodes": 42 }"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidRouteManifest(_)));
    }
}
