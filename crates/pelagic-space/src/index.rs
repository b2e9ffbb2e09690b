//! Bucketed spatial index over animal positions.
//!
//! The plane is partitioned into square buckets of side `bucket_size`.
//! Each animal lives in exactly one bucket; relocation is a no-op while
//! the animal stays within its bucket. Iteration order is insertion
//! order (via `indexmap`), so queries are deterministic for a given
//! sequence of operations.

use crate::error::SpaceError;
use crate::field::SpatialField;
use crate::edge::EdgeBehavior;
use indexmap::{IndexMap, IndexSet};
use pelagic_core::{AnimalId, Vec2};
use smallvec::SmallVec;

/// Integer bucket coordinate.
pub type Bucket = (i64, i64);

/// Animal lookup by position.
///
/// # Examples
///
/// ```
/// use pelagic_core::{AnimalId, Vec2};
/// use pelagic_space::SpatialIndex;
///
/// let mut idx = SpatialIndex::new(10.0).unwrap();
/// idx.insert(AnimalId(1), Vec2::new(5.0, 5.0));
/// idx.insert(AnimalId(2), Vec2::new(15.0, 5.0));
/// idx.insert(AnimalId(3), Vec2::new(45.0, 5.0));
/// let near = idx.query_neighbourhood(Vec2::new(6.0, 6.0));
/// assert!(near.contains(&AnimalId(1)) && near.contains(&AnimalId(2)));
/// assert!(!near.contains(&AnimalId(3)));
/// ```
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    bucket_size: f64,
    buckets: IndexMap<Bucket, IndexSet<AnimalId>>,
    locations: IndexMap<AnimalId, Bucket>,
}

impl SpatialIndex {
    /// Create an empty index.
    pub fn new(bucket_size: f64) -> Result<Self, SpaceError> {
        if !bucket_size.is_finite() || bucket_size <= 0.0 {
            return Err(SpaceError::InvalidBucketSize { size: bucket_size });
        }
        Ok(Self {
            bucket_size,
            buckets: IndexMap::new(),
            locations: IndexMap::new(),
        })
    }

    /// Side of one bucket.
    pub fn bucket_size(&self) -> f64 {
        self.bucket_size
    }

    /// Bucket containing `pos`.
    pub fn bucket_of(&self, pos: Vec2) -> Bucket {
        (
            (pos.x / self.bucket_size).floor() as i64,
            (pos.y / self.bucket_size).floor() as i64,
        )
    }

    /// Number of indexed animals.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether no animal is indexed.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether `id` is indexed.
    pub fn contains(&self, id: AnimalId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Index `id` at `pos`. An already indexed animal is relocated.
    pub fn insert(&mut self, id: AnimalId, pos: Vec2) {
        if self.locations.contains_key(&id) {
            self.relocate(id, pos);
            return;
        }
        let b = self.bucket_of(pos);
        self.buckets.entry(b).or_default().insert(id);
        self.locations.insert(id, b);
    }

    /// Remove `id`. Returns whether it was indexed.
    pub fn remove(&mut self, id: AnimalId) -> bool {
        match self.locations.swap_remove(&id) {
            Some(b) => {
                self.detach(id, b);
                true
            }
            None => false,
        }
    }

    /// Move `id` to `pos`. Unknown ids are inserted.
    pub fn relocate(&mut self, id: AnimalId, pos: Vec2) {
        let new = self.bucket_of(pos);
        match self.locations.get_mut(&id) {
            Some(old) if *old == new => {}
            Some(old) => {
                let prev = *old;
                *old = new;
                self.detach(id, prev);
                self.buckets.entry(new).or_default().insert(id);
            }
            None => self.insert(id, pos),
        }
    }

    fn detach(&mut self, id: AnimalId, bucket: Bucket) {
        if let Some(set) = self.buckets.get_mut(&bucket) {
            set.swap_remove(&id);
            if set.is_empty() {
                self.buckets.swap_remove(&bucket);
            }
        }
    }

    /// Animals in the 3x3 buckets around `pos`.
    pub fn query_neighbourhood(&self, pos: Vec2) -> Vec<AnimalId> {
        let (bx, by) = self.bucket_of(pos);
        self.collect_range(bx - 1..=bx + 1, by - 1..=by + 1)
    }

    /// Animals in every bucket overlapping the square around `pos` of
    /// half-side `radius`.
    ///
    /// The result is a superset of the animals within `radius`; callers
    /// filter by exact distance.
    pub fn query_radius(&self, pos: Vec2, radius: f64) -> Vec<AnimalId> {
        let r = radius.max(0.0);
        let (x0, y0) = self.bucket_of(Vec2::new(pos.x - r, pos.y - r));
        let (x1, y1) = self.bucket_of(Vec2::new(pos.x + r, pos.y + r));
        self.collect_range(x0..=x1, y0..=y1)
    }

    /// Like [`query_radius`](Self::query_radius), also covering the images
    /// of `pos` across wrapped borders of `field`.
    pub fn query_radius_in(&self, field: &SpatialField, pos: Vec2, radius: f64) -> Vec<AnimalId> {
        if !field.wraps() {
            return self.query_radius(pos, radius);
        }
        let w = field.width() as f64;
        let h = field.height() as f64;
        let xs: SmallVec<[f64; 3]> = match field.x_edge() {
            EdgeBehavior::Wrap => [-w, 0.0, w].into_iter().collect(),
            EdgeBehavior::Bounce => [0.0].into_iter().collect(),
        };
        let ys: SmallVec<[f64; 3]> = match field.y_edge() {
            EdgeBehavior::Wrap => [-h, 0.0, h].into_iter().collect(),
            EdgeBehavior::Bounce => [0.0].into_iter().collect(),
        };
        let mut seen = IndexSet::new();
        for dx in &xs {
            for dy in &ys {
                let image = Vec2::new(pos.x + dx, pos.y + dy);
                seen.extend(self.query_radius(image, radius));
            }
        }
        seen.into_iter().collect()
    }

    fn collect_range(
        &self,
        xs: std::ops::RangeInclusive<i64>,
        ys: std::ops::RangeInclusive<i64>,
    ) -> Vec<AnimalId> {
        let mut out = Vec::new();
        // Sparse buckets: scanning the occupied set beats probing a huge range.
        let width = xs.end().saturating_sub(*xs.start()).saturating_add(1);
        let height = ys.end().saturating_sub(*ys.start()).saturating_add(1);
        let span = width.saturating_mul(height);
        if span as usize > self.buckets.len() {
            for (b, set) in &self.buckets {
                if xs.contains(&b.0) && ys.contains(&b.1) {
                    out.extend(set.iter().copied());
                }
            }
        } else {
            for bx in xs {
                for by in ys.clone() {
                    if let Some(set) = self.buckets.get(&(bx, by)) {
                        out.extend(set.iter().copied());
                    }
                }
            }
        }
        out
    }

    /// Check that every listed animal is indexed in the bucket matching
    /// its position and that nothing else is indexed.
    pub fn is_consistent<I>(&self, positions: I) -> bool
    where
        I: IntoIterator<Item = (AnimalId, Vec2)>,
    {
        let mut count = 0usize;
        for (id, pos) in positions {
            count += 1;
            let expected = self.bucket_of(pos);
            match self.locations.get(&id) {
                Some(b) if *b == expected => {}
                _ => return false,
            }
            match self.buckets.get(&expected) {
                Some(set) if set.contains(&id) => {}
                _ => return false,
            }
        }
        let bucketed: usize = self.buckets.values().map(IndexSet::len).sum();
        count == self.locations.len() && bucketed == count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_bucket_size() {
        assert!(SpatialIndex::new(0.0).is_err());
        assert!(SpatialIndex::new(f64::NAN).is_err());
    }

    #[test]
    fn relocate_within_bucket_is_noop() {
        let mut idx = SpatialIndex::new(10.0).unwrap();
        idx.insert(AnimalId(1), Vec2::new(1.0, 1.0));
        idx.relocate(AnimalId(1), Vec2::new(9.0, 9.0));
        assert!(idx.is_consistent([(AnimalId(1), Vec2::new(9.0, 9.0))]));
        idx.relocate(AnimalId(1), Vec2::new(11.0, 9.0));
        assert!(idx.is_consistent([(AnimalId(1), Vec2::new(11.0, 9.0))]));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn remove_empties_buckets() {
        let mut idx = SpatialIndex::new(10.0).unwrap();
        idx.insert(AnimalId(1), Vec2::new(1.0, 1.0));
        assert!(idx.remove(AnimalId(1)));
        assert!(!idx.remove(AnimalId(1)));
        assert!(idx.is_empty());
        assert!(idx.query_neighbourhood(Vec2::new(1.0, 1.0)).is_empty());
        assert!(idx.is_consistent(std::iter::empty()));
    }

    #[test]
    fn radius_query_covers_negative_coordinates() {
        let mut idx = SpatialIndex::new(5.0).unwrap();
        idx.insert(AnimalId(1), Vec2::new(-3.0, -3.0));
        idx.insert(AnimalId(2), Vec2::new(30.0, 30.0));
        let hits = idx.query_radius(Vec2::new(1.0, 1.0), 5.0);
        assert_eq!(hits, vec![AnimalId(1)]);
    }

    #[test]
    fn wrapped_query_sees_across_seam() {
        let field = SpatialField::new(100, 100, EdgeBehavior::Wrap, EdgeBehavior::Bounce).unwrap();
        let mut idx = SpatialIndex::new(5.0).unwrap();
        idx.insert(AnimalId(7), Vec2::new(99.0, 50.0));
        assert!(idx.query_radius(Vec2::new(1.0, 50.0), 3.0).is_empty());
        assert_eq!(
            idx.query_radius_in(&field, Vec2::new(1.0, 50.0), 3.0),
            vec![AnimalId(7)]
        );
    }
}
