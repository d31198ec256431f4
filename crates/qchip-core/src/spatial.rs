use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::BBox;
use crate::qgeometry::QGeometry;

/// An entry in the R-tree spatial index, referencing a geometry row by index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the row slice the index was built from.
    pub row_index: usize,
    /// Bounding box of the row's shape.
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Bounding-box index over geometry rows, for finding candidate overlaps.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Index the rows accepted by `filter`. Row indices refer to `rows`.
    pub fn from_rows<F>(rows: &[QGeometry], filter: F) -> Self
    where
        F: Fn(&QGeometry) -> bool,
    {
        let entries = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filter(*row))
            .filter_map(|(row_index, row)| row.bbox().map(|bbox| SpatialEntry { row_index, bbox }))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, entry: SpatialEntry) {
        self.tree.insert(entry);
    }

    /// All entries whose bounding box intersects `bbox`.
    pub fn query_bbox(&self, bbox: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
