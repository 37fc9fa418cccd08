use crate::dom::{Document, rendered_text};
use crate::error::Result;
use crate::locate::strategy::{Chain, Strategy};
use scraper::ElementRef;
use std::thread;
use std::time::{Duration, Instant};

/// Something that can be snapshotted and searched: a live browsing context or
/// a fixed document
pub trait Surface {
    /// Take a snapshot of the current document
    fn snapshot(&self) -> Result<Document>;

    /// Whether repeated snapshots can differ; fixed surfaces are tried once per strategy
    fn is_live(&self) -> bool {
        true
    }
}

impl Surface for Document {
    fn snapshot(&self) -> Result<Document> {
        Ok(self.clone())
    }

    fn is_live(&self) -> bool {
        false
    }
}

impl<S: Surface + ?Sized> Surface for &S {
    fn snapshot(&self) -> Result<Document> {
        (**self).snapshot()
    }

    fn is_live(&self) -> bool {
        (**self).is_live()
    }
}

/// Bounded polling parameters applied to each strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Maximum time spent on one strategy
    pub timeout: Duration,

    /// Delay between two snapshots of a live surface
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(250),
        }
    }
}

impl WaitPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// A single attempt per strategy
    pub fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            interval: Duration::ZERO,
        }
    }

    /// Builder method: set polling interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone)]
pub struct Located {
    snapshot: Document,
    strategy: Strategy,
    position: usize,
    accepted: Vec<usize>,
}

impl Located {
    /// Index of the winning strategy within its chain
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Snapshot the match was found in
    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }

    /// Accepted elements of the winning strategy, in document order
    pub fn elements(&self) -> Vec<ElementRef<'_>> {
        self.strategy
            .select(self.snapshot.root())
            .into_iter()
            .enumerate()
            .filter(|(i, _)| self.accepted.contains(i))
            .map(|(_, element)| element)
            .collect()
    }

    /// First accepted element
    pub fn first(&self) -> Option<ElementRef<'_>> {
        self.elements().into_iter().next()
    }

    /// Rendered text of the first accepted element
    pub fn text(&self) -> String {
        self.first().map(rendered_text).unwrap_or_default()
    }
}

/// Resolve `chain` against `surface`; `None` means no strategy matched in time.
pub fn resolve<S: Surface + ?Sized>(surface: &S, chain: &Chain, policy: WaitPolicy) -> Option<Located> {
    resolve_where(surface, chain, policy, |_| true)
}

/// Like [`resolve`], but a strategy only matches when `accept` holds for at
/// least one of its elements
pub fn resolve_where<S, F>(surface: &S, chain: &Chain, policy: WaitPolicy, accept: F) -> Option<Located>
where
    S: Surface + ?Sized,
    F: Fn(ElementRef<'_>) -> bool,
{
    for (position, strategy) in chain.iter().enumerate() {
        if let Some((snapshot, accepted)) = poll_strategy(surface, strategy, policy, &accept) {
            log::debug!("{}: matched strategy #{} ({})", chain.label(), position, strategy);
            return Some(Located {
                snapshot,
                strategy: strategy.clone(),
                position,
                accepted,
            });
        }
        log::debug!("{}: strategy #{} ({}) found nothing", chain.label(), position, strategy);
    }
    None
}

fn poll_strategy<S, F>(surface: &S, strategy: &Strategy, policy: WaitPolicy, accept: &F) -> Option<(Document, Vec<usize>)>
where
    S: Surface + ?Sized,
    F: Fn(ElementRef<'_>) -> bool,
{
    // An unrepresentable deadline means no deadline
    let deadline = Instant::now().checked_add(policy.timeout);
    loop {
        match surface.snapshot() {
            Ok(snapshot) => {
                let accepted: Vec<usize> = strategy
                    .select(snapshot.root())
                    .into_iter()
                    .enumerate()
                    .filter(|(_, element)| accept(*element))
                    .map(|(i, _)| i)
                    .collect();
                if !accepted.is_empty() {
                    return Some((snapshot, accepted));
                }
            }
            Err(e) => log::debug!("Snapshot failed while polling for {}: {}", strategy, e),
        }

        if !surface.is_live() {
            return None;
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return None;
                }
                policy.interval.min(deadline - now)
            }
            None => policy.interval,
        };
        thread::sleep(pause);
    }
}
