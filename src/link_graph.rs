use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;

/// Handle of a page inside the graph arena
pub type PageId = NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutOfScope,
    /// Wildcard left over from a robots.txt pattern
    Malformed,
}

/// Fetch outcome of a page. Only moves forward, see [`PageGraph::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Unvisited,
    Fetching,
    Visited(u16),
    Skipped(SkipReason),
    Errored(String),
}

impl PageStatus {
    fn can_become(&self, next: &PageStatus) -> bool {
        match (self, next) {
            (PageStatus::Unvisited, PageStatus::Unvisited) => false,
            (PageStatus::Unvisited, _) => true,
            (PageStatus::Fetching, PageStatus::Visited(_) | PageStatus::Errored(_) | PageStatus::Skipped(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStatus::Unvisited => write!(f, "unvisited"),
            PageStatus::Fetching => write!(f, "fetching"),
            PageStatus::Visited(code) => write!(f, "visited:{}", code),
            PageStatus::Skipped(SkipReason::OutOfScope) => write!(f, "skipped:out-of-scope"),
            PageStatus::Skipped(SkipReason::Malformed) => write!(f, "skipped:malformed"),
            PageStatus::Errored(_) => write!(f, "errored"),
        }
    }
}

#[derive(Debug)]
pub struct Page {
    pub url: String,
    pub status: PageStatus,
}

/// Directed graph of discovered pages. Nodes live in the petgraph arena and
/// are looked up by canonical URL; an edge `a -> b` means `a` links to `b`.
#[derive(Debug, Default)]
pub struct PageGraph {
    graph: DiGraph<Page, ()>,
    index: HashMap<String, PageId>,
}

impl PageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the page stored under `url`, creating an unvisited one if needed.
    /// The flag tells whether the page was created by this call.
    pub fn get_or_insert(&mut self, url: &str) -> (PageId, bool) {
        if let Some(&id) = self.index.get(url) {
            return (id, false);
        }
        let id = self.graph.add_node(Page {
            url: url.to_string(),
            status: PageStatus::Unvisited,
        });
        self.index.insert(url.to_string(), id);
        (id, true)
    }

    pub fn find(&self, url: &str) -> Option<PageId> {
        self.index.get(url).copied()
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.graph[id]
    }

    /// Records that `parent` links to `child`. Repeated links collapse into one edge.
    pub fn link(&mut self, parent: PageId, child: PageId) {
        self.graph.update_edge(parent, child, ());
    }

    /// Moves the page to `next` if the transition is allowed.
    /// Returns false and leaves the page untouched otherwise.
    pub fn transition(&mut self, id: PageId, next: PageStatus) -> bool {
        let page = &mut self.graph[id];
        if !page.status.can_become(&next) {
            return false;
        }
        page.status = next;
        true
    }

    pub fn parents(&self, id: PageId) -> Vec<PageId> {
        self.sorted_neighbors(id, Direction::Incoming)
    }

    pub fn children(&self, id: PageId) -> Vec<PageId> {
        self.sorted_neighbors(id, Direction::Outgoing)
    }

    // petgraph walks adjacency lists newest first; discovery order reads better
    fn sorted_neighbors(&self, id: PageId, direction: Direction) -> Vec<PageId> {
        let mut ids: Vec<PageId> = self.graph.neighbors_directed(id, direction).collect();
        ids.sort();
        ids
    }

    /// Pages in the order they were discovered
    pub fn pages(&self) -> impl Iterator<Item = (PageId, &Page)> {
        self.graph.node_indices().map(move |id| (id, &self.graph[id]))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
