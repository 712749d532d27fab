use std::collections::{HashMap, HashSet, VecDeque};

use crate::link_graph::{PageGraph, PageId, PageStatus, SkipReason};

use super::classify::Site;

/// Result sets kept next to the page queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Email,
    Subdomain,
    External,
    Source,
    Handler,
    Form,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Email,
        Category::Subdomain,
        Category::External,
        Category::Source,
        Category::Handler,
        Category::Form,
    ];
}

/// Insertion-ordered set of strings. Membership is permanent.
#[derive(Debug, Default)]
pub struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    pub fn insert(&mut self, value: &str) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.to_string());
        self.items.push(value.to_string());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pages waiting to be visited plus everything else found so far.
/// A URL is queued at most once for the whole run: the page graph doubles as
/// the permanent "seen" set.
pub struct Frontier {
    site: Site,
    pub graph: PageGraph,
    queue: VecDeque<PageId>,
    records: HashMap<Category, OrderedSet>,
}

impl Frontier {
    pub fn new(site: Site) -> Self {
        let records = Category::ALL
            .iter()
            .map(|&category| (category, OrderedSet::default()))
            .collect();
        Self {
            site,
            graph: PageGraph::new(),
            queue: VecDeque::new(),
            records,
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Adds a canonical URL found on `parent`. Returns false if the URL was
    /// ever enqueued before; the parent link is still recorded in that case.
    /// Pages on another authority are created already skipped and never queued.
    pub fn enqueue(&mut self, url: &str, parent: Option<PageId>) -> bool {
        let (id, created) = self.graph.get_or_insert(url);
        if let Some(parent) = parent {
            self.graph.link(parent, id);
        }
        if !created {
            return false;
        }

        if self.site.in_scope(url) {
            self.queue.push_back(id);
        } else {
            self.graph.transition(id, PageStatus::Skipped(SkipReason::OutOfScope));
        }
        true
    }

    /// Next unvisited page in discovery order
    pub fn dequeue_next(&mut self) -> Option<PageId> {
        while let Some(id) = self.queue.pop_front() {
            if self.graph.page(id).status == PageStatus::Unvisited {
                return Some(id);
            }
        }
        None
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Adds `value` to the set for `category`. Returns false if it was already there.
    pub fn record(&mut self, category: Category, value: &str) -> bool {
        self.records.entry(category).or_default().insert(value)
    }

    pub fn records(&self, category: Category) -> &OrderedSet {
        // every category is created in `new`
        &self.records[&category]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn frontier() -> Frontier {
        let seed = Url::parse("http://example.com").unwrap();
        Frontier::new(Site::new(&seed, Vec::new()).unwrap())
    }

    #[test]
    fn test_enqueue_dedup_is_permanent() {
        let mut frontier = frontier();
        assert!(frontier.enqueue("http://example.com", None));
        assert!(!frontier.enqueue("http://example.com", None));

        let seed = frontier.dequeue_next().unwrap();
        frontier.graph.transition(seed, PageStatus::Fetching);
        frontier.graph.transition(seed, PageStatus::Visited(200));

        assert!(!frontier.enqueue("http://example.com", Some(seed)));
        assert_eq!(frontier.graph.len(), 1);
        assert_eq!(frontier.dequeue_next(), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = frontier();
        frontier.enqueue("http://example.com", None);
        let a = frontier.dequeue_next().unwrap();
        frontier.enqueue("http://example.com/b", Some(a));
        frontier.enqueue("http://example.com/c", Some(a));
        let b = frontier.dequeue_next().unwrap();
        frontier.enqueue("http://example.com/d", Some(b));
        assert_eq!(frontier.pending(), 2);

        let mut rest = Vec::new();
        while let Some(id) = frontier.dequeue_next() {
            rest.push(frontier.graph.page(id).url.clone());
        }
        assert_eq!(frontier.graph.page(b).url, "http://example.com/b");
        assert_eq!(rest, vec!["http://example.com/c", "http://example.com/d"]);
        assert_eq!(frontier.pending(), 0);
    }

    #[test]
    fn test_repeat_enqueue_links_parent() {
        let mut frontier = frontier();
        frontier.enqueue("http://example.com", None);
        let root = frontier.graph.find("http://example.com").unwrap();
        frontier.enqueue("http://example.com/a", Some(root));
        let a = frontier.graph.find("http://example.com/a").unwrap();
        assert!(!frontier.enqueue("http://example.com", Some(a)));
        assert_eq!(frontier.graph.parents(root), vec![a]);
        assert_eq!(frontier.graph.parents(a), vec![root]);
    }

    #[test]
    fn test_out_of_scope_never_queued() {
        let mut frontier = frontier();
        assert!(frontier.enqueue("http://other.example/x", None));
        assert!(frontier.enqueue("tel:123", None));
        assert_eq!(frontier.dequeue_next(), None);

        let id = frontier.graph.find("http://other.example/x").unwrap();
        assert_eq!(frontier.graph.page(id).status, PageStatus::Skipped(SkipReason::OutOfScope));
    }

    #[test]
    fn test_dequeue_skips_settled_pages() {
        let mut frontier = frontier();
        frontier.enqueue("http://example.com/a", None);
        frontier.enqueue("http://example.com/b", None);
        let a = frontier.graph.find("http://example.com/a").unwrap();
        frontier.graph.transition(a, PageStatus::Skipped(SkipReason::Malformed));

        let next = frontier.dequeue_next().unwrap();
        assert_eq!(frontier.graph.page(next).url, "http://example.com/b");
    }

    #[test]
    fn test_records_dedup_per_category() {
        let mut frontier = frontier();
        assert!(frontier.record(Category::Email, "x@example.com"));
        assert!(!frontier.record(Category::Email, "x@example.com"));
        assert!(frontier.record(Category::Form, "x@example.com"));
        assert!(frontier.record(Category::Email, "a@example.com"));

        let emails: Vec<&str> = frontier.records(Category::Email).iter().collect();
        assert_eq!(emails, vec!["x@example.com", "a@example.com"]);
        assert!(frontier.records(Category::Subdomain).is_empty());
    }
}
