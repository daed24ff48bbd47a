/// Outcome of a crawl node once it and all of its children have finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlOutcome {
    /// The node and its whole subtree ran to completion
    Completed,

    /// The run was stopped before the node or part of its subtree could start
    Interrupted,
}

impl CrawlOutcome {
    /// Folds child outcomes: interrupted if any child was interrupted
    pub fn fold<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = CrawlOutcome>,
    {
        if outcomes
            .into_iter()
            .any(|outcome| outcome == CrawlOutcome::Interrupted)
        {
            CrawlOutcome::Interrupted
        } else {
            CrawlOutcome::Completed
        }
    }
}
