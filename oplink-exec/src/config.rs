/// Behavior flags evaluated once, at repository construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOptions {
    /// When false, link processing is disabled entirely: the repository is
    /// empty and every query returns nothing.
    pub process_links: bool,
    /// When false, no dependency graph is built (cycle detection included)
    /// and scenario reordering returns its input unchanged.
    pub reorder: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            process_links: true,
            reorder: true,
        }
    }
}
