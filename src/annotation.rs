use ahash::AHashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// One input record: the analyzed value and, when grouping, the group value.
/// A missing value is analyzed as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InputRow {
    pub id: u64,
    pub value: Option<String>,
    pub group: Option<String>,
}

impl InputRow {
    pub fn new(id: u64, value: Option<&str>) -> Self {
        Self {
            id,
            value: value.map(str::to_string),
            group: None,
        }
    }

    pub fn with_group(mut self, group: Option<&str>) -> Self {
        self.group = group.map(str::to_string);
        self
    }

    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// Handle to the set of rows that matched one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowAnnotation(u64);

impl RowAnnotation {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Records which rows matched which pattern. Injected into every engine; the
/// engine calls `create_annotation` once per new pattern and `annotate` once
/// per matched row, including the row that founded the pattern.
pub trait RowAnnotationFactory: Send + Sync {
    fn create_annotation(&self) -> RowAnnotation;
    fn annotate(&self, row: &InputRow, distinct_count: u64, annotation: RowAnnotation);
}

/// Hands out handles and records nothing.
#[derive(Debug, Default)]
pub struct NoopRowAnnotationFactory {
    next: AtomicU64,
}

impl RowAnnotationFactory for NoopRowAnnotationFactory {
    fn create_annotation(&self) -> RowAnnotation {
        RowAnnotation(self.next.fetch_add(1, Ordering::Relaxed))
    }

    fn annotate(&self, _row: &InputRow, _distinct_count: u64, _annotation: RowAnnotation) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotatedRows {
    pub row_count: u64,
    pub row_ids: Vec<u64>,
}

/// Keeps counts and up to `max_rows` row ids per annotation in memory.
#[derive(Debug)]
pub struct InMemoryRowAnnotationFactory {
    next: AtomicU64,
    max_rows: usize,
    annotations: Mutex<AHashMap<RowAnnotation, AnnotatedRows>>,
}

impl Default for InMemoryRowAnnotationFactory {
    fn default() -> Self {
        Self::with_max_rows(1000)
    }
}

impl InMemoryRowAnnotationFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            next: AtomicU64::new(0),
            max_rows,
            annotations: Mutex::new(AHashMap::new()),
        }
    }

    pub fn annotated(&self, annotation: RowAnnotation) -> Option<AnnotatedRows> {
        let map = self.annotations.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(&annotation).cloned()
    }

    pub fn row_count(&self, annotation: RowAnnotation) -> u64 {
        self.annotated(annotation).map_or(0, |a| a.row_count)
    }

    pub fn row_ids(&self, annotation: RowAnnotation) -> Vec<u64> {
        self.annotated(annotation).map(|a| a.row_ids).unwrap_or_default()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl RowAnnotationFactory for InMemoryRowAnnotationFactory {
    fn create_annotation(&self) -> RowAnnotation {
        let annotation = RowAnnotation(self.next.fetch_add(1, Ordering::Relaxed));
        let mut map = self.annotations.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(annotation, AnnotatedRows::default());
        annotation
    }

    fn annotate(&self, row: &InputRow, distinct_count: u64, annotation: RowAnnotation) {
        let mut map = self.annotations.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = map.entry(annotation).or_default();
        entry.row_count += distinct_count;
        if entry.row_ids.len() < self.max_rows {
            entry.row_ids.push(row.id);
        }
    }
}
