//! Resolution of `/`-separated test names into list and detail routes

use serde::Serialize;
use std::collections::BTreeMap;

/// One child shown in a test listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub segment: String,
    pub full_path: String,
    /// A test with exactly this name exists
    pub is_test: bool,
    /// Other tests live below this path
    pub has_children: bool,
}

/// What a route path points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Route {
    /// A test's detail page; `children` is non-empty when the name is also a prefix
    Test { name: String, children: Vec<TreeEntry> },
    /// A listing of everything below `prefix`
    Group { prefix: String, children: Vec<TreeEntry> },
    NotFound,
}

#[derive(Debug, Default)]
struct Node {
    is_test: bool,
    children: BTreeMap<String, Node>,
}

/// Prefix tree of test names
#[derive(Debug, Default)]
pub struct TestTree {
    root: Node,
}

impl TestTree {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::default();
        for name in names {
            tree.insert(name.as_ref());
        }
        tree
    }

    pub fn insert(&mut self, name: &str) {
        let mut node = &mut self.root;
        let mut any = false;
        for segment in segments(name) {
            node = node.children.entry(segment.to_string()).or_default();
            any = true;
        }
        if any {
            node.is_test = true;
        }
    }

    pub fn contains_test(&self, name: &str) -> bool {
        self.find(name).is_some_and(|node| node.is_test)
    }

    /// Resolve a route path; the empty path lists the top-level entries
    pub fn resolve(&self, path: &str) -> Route {
        let prefix = segments(path).collect::<Vec<_>>().join("/");
        let Some(node) = self.find(&prefix) else {
            return Route::NotFound;
        };

        let children = node
            .children
            .iter()
            .map(|(segment, child)| TreeEntry {
                segment: segment.clone(),
                full_path: if prefix.is_empty() {
                    segment.clone()
                } else {
                    format!("{prefix}/{segment}")
                },
                is_test: child.is_test,
                has_children: !child.children.is_empty(),
            })
            .collect();

        if node.is_test {
            Route::Test {
                name: prefix,
                children,
            }
        } else {
            Route::Group { prefix, children }
        }
    }

    /// `(segment, cumulative path)` pairs for a breadcrumb trail
    pub fn breadcrumbs(path: &str) -> Vec<(String, String)> {
        let mut trail = Vec::new();
        let mut cumulative = String::new();
        for segment in segments(path) {
            if !cumulative.is_empty() {
                cumulative.push('/');
            }
            cumulative.push_str(segment);
            trail.push((segment.to_string(), cumulative.clone()));
        }
        trail
    }

    fn find(&self, path: &str) -> Option<&Node> {
        segments(path).try_fold(&self.root, |node, segment| node.children.get(segment))
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
