use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::error::{PulseError, Result};

/// Instrument kind, rendered on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// One numeric value, stored as the bit pattern of an `f64`.
#[derive(Debug, Default)]
pub(crate) struct Cell {
    bits: AtomicU64,
}

impl Cell {
    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, v: f64) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn add(&self, delta: f64) {
        self.update(|cur| Some(cur + delta));
    }

    /// Raise the value to `target`; never lowers it.
    pub(crate) fn raise_to(&self, target: f64) {
        self.update(|cur| (target > cur).then_some(target));
    }

    fn update(&self, f: impl Fn(f64) -> Option<f64>) {
        let mut cur = self.bits.load(Ordering::Relaxed);
        loop {
            let Some(next) = f(f64::from_bits(cur)) else { return };
            match self.bits.compare_exchange_weak(
                cur,
                next.to_bits(),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => cur = actual,
            }
        }
    }
}

/// Label tuples sharing one hash (almost always a single entry).
type Bucket = Vec<(Box<[String]>, Arc<Cell>)>;

fn find(bucket: &Bucket, label_values: &[&str]) -> Option<Arc<Cell>> {
    bucket
        .iter()
        .find(|(k, _)| k.iter().map(String::as_str).eq(label_values.iter().copied()))
        .map(|(_, c)| Arc::clone(c))
}

/// A named instrument and all of its label-tuple cells.
///
/// Cells are keyed by a hash of the borrowed label values, so looking up an
/// existing tuple allocates nothing.
#[derive(Debug)]
pub struct MetricFamily {
    name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
    hasher: RandomState,
    cells: DashMap<u64, Bucket>,
    // first-use order of label tuples
    order: Mutex<Vec<(Box<[String]>, Arc<Cell>)>>,
}

impl MetricFamily {
    pub(crate) fn new(name: &str, help: &str, kind: MetricKind, label_names: &[&str]) -> Result<Self> {
        if !is_valid_metric_name(name) {
            return Err(PulseError::InvalidName(name.to_string()));
        }
        for (i, label) in label_names.iter().enumerate() {
            if !is_valid_label_name(label) || label_names[..i].contains(label) {
                return Err(PulseError::InvalidName(format!("{name}: label {label}")));
            }
        }

        let family = Self {
            name: name.to_string(),
            help: help.to_string(),
            kind,
            label_names: label_names.iter().map(|s| s.to_string()).collect(),
            hasher: RandomState::new(),
            cells: DashMap::new(),
            order: Mutex::new(Vec::new()),
        };
        // Unlabeled instruments render as 0 before first use.
        if family.label_names.is_empty() {
            family.cell(&[])?;
        }
        Ok(family)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    fn check_arity(&self, label_values: &[&str]) -> Result<()> {
        if label_values.len() != self.label_names.len() {
            return Err(PulseError::LabelArity {
                metric: self.name.clone(),
                expected: self.label_names.len(),
                got: label_values.len(),
            });
        }
        Ok(())
    }

    /// Cell for a label tuple, created at 0 on first use.
    pub(crate) fn cell(&self, label_values: &[&str]) -> Result<Arc<Cell>> {
        self.check_arity(label_values)?;
        let hash = self.hasher.hash_one(label_values);

        if let Some(cell) = self.cells.get(&hash).and_then(|b| find(b.value(), label_values)) {
            return Ok(cell);
        }

        let mut bucket = self.cells.entry(hash).or_default();
        if let Some(cell) = find(bucket.value(), label_values) {
            return Ok(cell);
        }
        let key: Box<[String]> = label_values.iter().map(|v| v.to_string()).collect();
        let cell = Arc::new(Cell::default());
        self.order
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((key.clone(), Arc::clone(&cell)));
        bucket.value_mut().push((key, Arc::clone(&cell)));
        Ok(cell)
    }

    /// Current value of a label tuple without creating it.
    pub(crate) fn peek(&self, label_values: &[&str]) -> Result<Option<f64>> {
        self.check_arity(label_values)?;
        let hash = self.hasher.hash_one(label_values);
        Ok(self
            .cells
            .get(&hash)
            .and_then(|b| find(b.value(), label_values))
            .map(|c| c.get()))
    }

    /// Point-in-time read of every label tuple, in first-use order.
    pub fn samples(&self) -> Vec<(Vec<String>, f64)> {
        let order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        order.iter().map(|(k, c)| (k.to_vec(), c.get())).collect()
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a metric name without registering it.
pub fn validate_metric_name(name: &str) -> Result<()> {
    if is_valid_metric_name(name) {
        Ok(())
    } else {
        Err(PulseError::InvalidName(name.to_string()))
    }
}
