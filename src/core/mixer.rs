use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::models::{CreatorFilter, CreatorRecord, Platform, SortKey};
use crate::services::repository::{CreatorRepository, RepositoryError};

/// Target share of one platform in a mixed result set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformShare {
    pub platform: Platform,
    pub share: f64,
}

/// One page plus the total it was cut from
#[derive(Debug, Clone, PartialEq)]
pub struct MixedPage {
    pub creators: Vec<CreatorRecord>,
    pub total_count: u64,
    /// False when the mixed fetch failed and the unmixed query was used
    pub mixed: bool,
}

/// Balances results across platforms when a search names none
#[derive(Debug, Clone)]
pub struct PlatformMixer {
    shares: Vec<PlatformShare>,
}

impl Default for PlatformMixer {
    fn default() -> Self {
        Self::new(vec![
            PlatformShare { platform: Platform::Twitch, share: 0.4 },
            PlatformShare { platform: Platform::YouTube, share: 0.3 },
            PlatformShare { platform: Platform::Kick, share: 0.3 },
        ])
    }
}

impl PlatformMixer {
    /// Shares that are non-positive or non-finite are dropped
    pub fn new(shares: Vec<PlatformShare>) -> Self {
        let shares = shares
            .into_iter()
            .filter(|s| s.share.is_finite() && s.share > 0.0)
            .collect();
        Self { shares }
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.shares.iter().map(|s| s.platform).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Split `total` rows across platforms by largest remainder
    ///
    /// Targets always sum to exactly `total`; remainder ties go to the
    /// platform listed first.
    pub fn allocate(&self, total: usize) -> Vec<(Platform, usize)> {
        let share_sum: f64 = self.shares.iter().map(|s| s.share).sum();
        if self.shares.is_empty() || share_sum <= 0.0 {
            return Vec::new();
        }

        let exact: Vec<f64> = self
            .shares
            .iter()
            .map(|s| s.share / share_sum * total as f64)
            .collect();
        let mut targets: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

        let assigned: usize = targets.iter().sum();
        let mut by_remainder: Vec<usize> = (0..exact.len()).collect();
        by_remainder.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.total_cmp(&ra).then(a.cmp(&b))
        });
        for &index in by_remainder.iter().take(total.saturating_sub(assigned)) {
            targets[index] += 1;
        }

        self.shares
            .iter()
            .zip(targets)
            .map(|(s, target)| (s.platform, target))
            .collect()
    }

    /// Fetch one page with platforms interleaved round-robin
    ///
    /// Targets are allocated for the first `offset + limit` rows. Every mixed
    /// platform, plus one stream for the platforms outside the mix, is
    /// fetched concurrently under the same predicate and ordering, each up
    /// to `offset + limit` rows so a platform that runs short can be covered
    /// by the others. The page is cut from the merged sequence and the total
    /// is counted on the shared predicate. Any repository failure degrades
    /// to a single unmixed query.
    pub async fn fetch_page(
        &self,
        repository: &dyn CreatorRepository,
        filter: &CreatorFilter,
        order: &[SortKey],
        limit: usize,
        offset: usize,
    ) -> Result<MixedPage, RepositoryError> {
        match self.fetch_mixed(repository, filter, order, limit, offset).await {
            Ok(page) => Ok(page),
            Err(e) => {
                tracing::warn!("Platform mix failed, falling back to unmixed query: {}", e);

                let creators = repository.find(filter, order, limit, offset).await?;
                let total_count = repository.count(filter).await?;

                Ok(MixedPage {
                    creators,
                    total_count,
                    mixed: false,
                })
            }
        }
    }

    /// Platforms allowed by `filter` that have no share in the mix
    fn unlisted(&self, filter: &CreatorFilter) -> Vec<Platform> {
        Platform::ALL
            .iter()
            .copied()
            .filter(|p| !self.shares.iter().any(|s| s.platform == *p))
            .filter(|p| filter.platforms.is_empty() || filter.platforms.contains(p))
            .collect()
    }

    async fn fetch_mixed(
        &self,
        repository: &dyn CreatorRepository,
        filter: &CreatorFilter,
        order: &[SortKey],
        limit: usize,
        offset: usize,
    ) -> Result<MixedPage, RepositoryError> {
        let needed = offset.saturating_add(limit);
        let targets: Vec<usize> = self.allocate(needed).into_iter().map(|(_, t)| t).collect();

        let mut filters: Vec<CreatorFilter> = self
            .shares
            .iter()
            .map(|s| filter.with_platforms(vec![s.platform]))
            .collect();
        let unlisted = self.unlisted(filter);
        if !unlisted.is_empty() {
            filters.push(filter.with_platforms(unlisted));
        }

        let fetches = filters.iter().map(|f| repository.find(f, order, needed, 0));
        let mut streams = try_join_all(fetches).await?;

        let backfill = if streams.len() > targets.len() {
            streams.pop().unwrap_or_default()
        } else {
            Vec::new()
        };

        let total_count = repository.count(filter).await?;

        let creators = merge_by_targets(streams, &targets, backfill)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        Ok(MixedPage {
            creators,
            total_count,
            mixed: true,
        })
    }
}

/// Merge per-platform streams into one sequence
///
/// Round-robin over each stream's first `target` rows, then round-robin
/// over what the streams have left, then `backfill`. Every input row
/// appears exactly once.
pub fn merge_by_targets<T>(streams: Vec<Vec<T>>, targets: &[usize], backfill: Vec<T>) -> Vec<T> {
    let mut heads = Vec::with_capacity(streams.len());
    let mut tails = Vec::with_capacity(streams.len());

    for (index, mut stream) in streams.into_iter().enumerate() {
        let target = targets.get(index).copied().unwrap_or(0);
        let tail = stream.split_off(target.min(stream.len()));
        heads.push(stream);
        tails.push(tail);
    }

    let mut merged = interleave(heads);
    merged.extend(interleave(tails));
    merged.extend(backfill);
    merged
}

/// Round-robin merge keyed by list order, skipping exhausted lists
pub fn interleave<T>(lists: Vec<Vec<T>>) -> Vec<T> {
    let capacity = lists.iter().map(Vec::len).sum();
    let mut iters: Vec<std::vec::IntoIter<T>> = lists.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::with_capacity(capacity);

    while merged.len() < capacity {
        for iter in iters.iter_mut() {
            if let Some(item) = iter.next() {
                merged.push(item);
            }
        }
    }

    merged
}
