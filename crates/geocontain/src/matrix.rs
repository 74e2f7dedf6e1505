use ndarray::Array2;
use smallvec::SmallVec;

use crate::error::GeometryError;

/// Sorted polygon indices containing one point. Almost always zero or one.
pub type PolygonHits = SmallVec<[u32; 2]>;

/// A read-only boolean relation between polygons (rows) and points
/// (columns), stored in compressed sparse column form.
///
/// `offsets[j]..offsets[j+1]` indexes into `hits` to give the sorted list
/// of polygons containing point `j`. Supports O(log k) membership tests via
/// binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionMatrix {
    num_polygons: usize,
    /// Column offsets; length = `num_points + 1`.
    offsets: Vec<u32>,
    /// Flattened polygon lists; sorted within each column.
    hits: Vec<u32>,
}

impl IntersectionMatrix {
    /// Construct a matrix from per-point sorted polygon lists.
    pub(crate) fn from_columns(num_polygons: usize, columns: &[PolygonHits]) -> Self {
        debug_assert!(columns.iter().all(|c| c.windows(2).all(|w| w[0] < w[1])));
        Self {
            num_polygons,
            offsets: std::iter::once(0u32).chain(
                columns.iter()
                    .map(|c| c.len() as u32)
                    .scan(0u32, |acc, len| { *acc += len; Some(*acc) })
            ).collect(),
            hits: columns.iter().flatten().copied().collect(),
        }
    }

    /// Number of rows (polygons).
    #[inline] pub fn num_polygons(&self) -> usize { self.num_polygons }

    /// Number of columns (points).
    #[inline] pub fn num_points(&self) -> usize { self.offsets.len() - 1 }

    /// Number of true cells.
    #[inline] pub fn nnz(&self) -> usize { self.hits.len() }

    #[inline]
    fn range(&self, point: usize) -> std::ops::Range<usize> {
        self.offsets[point] as usize .. self.offsets[point + 1] as usize
    }

    /// Sorted polygons containing `point`.
    #[inline] pub fn column(&self, point: usize) -> &[u32] { &self.hits[self.range(point)] }

    /// Number of polygons containing `point`.
    #[inline] pub fn cardinality(&self, point: usize) -> usize { self.range(point).len() }

    /// Returns `true` if `polygon` contains `point`.
    #[inline]
    pub fn get(&self, polygon: usize, point: usize) -> bool {
        self.column(point).binary_search(&(polygon as u32)).is_ok()
    }

    /// Points contained by `polygon`, ascending.
    pub fn row(&self, polygon: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_points()).filter(move |&point| self.get(polygon, point))
    }

    /// Number of points contained by each polygon.
    pub fn row_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_polygons];
        for &polygon in &self.hits { counts[polygon as usize] += 1 }
        counts
    }

    /// Dense `[num_polygons, num_points]` boolean matrix.
    pub fn to_dense(&self) -> Array2<bool> {
        let mut dense = Array2::from_elem((self.num_polygons, self.num_points()), false);
        for point in 0..self.num_points() {
            for &polygon in self.column(point) {
                dense[[polygon as usize, point]] = true;
            }
        }
        dense
    }

    /// Indices of points contained by at least one polygon, in input order.
    pub fn clipped(&self) -> Vec<usize> {
        (0..self.num_points()).filter(|&point| self.cardinality(point) > 0).collect()
    }

    /// Per-point containing polygons.
    pub fn assignment(&self) -> Assignment {
        Assignment {
            matches: (0..self.num_points())
                .map(|point| PolygonHits::from_slice(self.column(point)))
                .collect(),
        }
    }
}

/// How a point contained by several polygons is paired with polygons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MultiMatch {
    /// Keep the lowest polygon index.
    #[default]
    First,
    /// Keep every containing polygon.
    All,
    /// Fail with [`GeometryError::AmbiguousContainment`].
    Error,
}

/// The containing polygons of every point, indexed by point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    matches: Vec<PolygonHits>,
}

impl Assignment {
    #[inline] pub fn len(&self) -> usize { self.matches.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.matches.is_empty() }

    /// Sorted polygons containing `point`.
    #[inline] pub fn get(&self, point: usize) -> &[u32] { &self.matches[point] }

    /// Iterate over `(point, polygons)` pairs in point order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u32])> + '_ {
        self.matches.iter().enumerate().map(|(point, hits)| (point, hits.as_slice()))
    }

    /// Number of points outside every polygon.
    pub fn unmatched(&self) -> usize {
        self.matches.iter().filter(|hits| hits.is_empty()).count()
    }

    /// Points contained by more than one polygon.
    pub fn ambiguous(&self) -> Vec<usize> {
        self.iter().filter(|(_, hits)| hits.len() > 1).map(|(point, _)| point).collect()
    }

    /// Flatten into `(point, polygon)` pairs in point order. Points outside
    /// every polygon yield no pair.
    pub fn pairs(&self, policy: MultiMatch) -> Result<Vec<(usize, u32)>, GeometryError> {
        let mut pairs = Vec::with_capacity(self.matches.len());
        for (point, hits) in self.iter() {
            match (hits, policy) {
                ([], _) => {},
                ([only], _) => pairs.push((point, *only)),
                ([first, ..], MultiMatch::First) => pairs.push((point, *first)),
                (_, MultiMatch::All) => pairs.extend(hits.iter().map(|&polygon| (point, polygon))),
                (_, MultiMatch::Error) => return Err(GeometryError::AmbiguousContainment {
                    point,
                    polygons: hits.to_vec(),
                }),
            }
        }
        Ok(pairs)
    }
}
