//! Candidate source selection.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;
use vermeer_core::{ContentPlan, SelectionStrategy, SourceItem};
use vermeer_error::VermeerResult;
use vermeer_interface::SourceRepository;

/// Picks the source items a plan execution generates from.
///
/// Used items never reach the selector; the repository excludes them.
#[derive(Debug, Clone, Copy)]
pub struct SourceSelector {
    recent_fetch_cap: usize,
}

impl SourceSelector {
    /// `recent_fetch_cap` bounds how many items the `recent` strategy loads.
    pub fn new(recent_fetch_cap: usize) -> Self {
        Self { recent_fetch_cap }
    }

    /// Select up to `plan.selection.count` unused items from the plan's sources.
    #[tracing::instrument(skip_all, fields(plan_id = %plan.id, strategy = %plan.selection.strategy))]
    pub async fn select(
        &self,
        sources: &dyn SourceRepository,
        plan: &ContentPlan,
    ) -> VermeerResult<Vec<SourceItem>> {
        if plan.source_ids.is_empty() || plan.selection.count == 0 {
            return Ok(Vec::new());
        }

        let count = plan.selection.count;
        let selected = match plan.selection.strategy {
            SelectionStrategy::Random => {
                let candidates = sources.unused_items(&plan.source_ids).await?;
                shuffle_take(candidates, count, &mut rand::thread_rng())
            }
            SelectionStrategy::Recent => {
                let mut candidates = sources
                    .recent_unused_items(&plan.source_ids, self.recent_fetch_cap)
                    .await?;
                candidates.truncate(count);
                candidates
            }
        };

        debug!(selected = selected.len(), "Selected source items");
        Ok(selected)
    }
}

/// Uniformly shuffle `items` (Fisher–Yates) and keep the first `count`.
pub fn shuffle_take<T, R: Rng + ?Sized>(mut items: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items.truncate(count);
    items
}
