//! Typed handles returned by registration.
//!
//! Handles are cheap to clone (`Arc` inside) and are the only way to mutate
//! values. Counter handles enforce non-negative increments.

use std::sync::Arc;

use crate::error::{PulseError, Result};

use super::family::{Cell, MetricFamily};

fn check_amount(amount: f64) -> Result<()> {
    if amount.is_nan() || amount < 0.0 {
        return Err(PulseError::InvalidAmount(amount));
    }
    Ok(())
}

/// Monotonic counter family.
#[derive(Debug, Clone)]
pub struct Counter {
    family: Arc<MetricFamily>,
}

impl Counter {
    pub(crate) fn new(family: Arc<MetricFamily>) -> Self {
        Self { family }
    }

    pub fn family(&self) -> &MetricFamily {
        &self.family
    }

    /// Increment by 1.
    pub fn inc(&self, label_values: &[&str]) -> Result<()> {
        self.increment(label_values, 1.0)
    }

    /// Increment by `amount` (must be >= 0).
    pub fn increment(&self, label_values: &[&str], amount: f64) -> Result<()> {
        check_amount(amount)?;
        self.family.cell(label_values)?.add(amount);
        Ok(())
    }

    /// Catch the counter up to an externally observed cumulative total.
    /// Totals below the current value are ignored.
    pub fn advance_to(&self, label_values: &[&str], total: f64) -> Result<()> {
        check_amount(total)?;
        self.family.cell(label_values)?.raise_to(total);
        Ok(())
    }

    /// Current value; 0 for a label tuple never used.
    pub fn value(&self, label_values: &[&str]) -> Result<f64> {
        Ok(self.family.peek(label_values)?.unwrap_or(0.0))
    }

    /// Resolve the label tuple once and return a handle to its cell.
    pub fn with_label_values(&self, label_values: &[&str]) -> Result<BoundCounter> {
        Ok(BoundCounter {
            cell: self.family.cell(label_values)?,
        })
    }
}

/// Counter cell for one label tuple.
#[derive(Debug, Clone)]
pub struct BoundCounter {
    cell: Arc<Cell>,
}

impl BoundCounter {
    pub fn inc(&self) {
        self.cell.add(1.0);
    }

    pub fn increment(&self, amount: f64) -> Result<()> {
        check_amount(amount)?;
        self.cell.add(amount);
        Ok(())
    }

    pub fn value(&self) -> f64 {
        self.cell.get()
    }
}

/// Gauge family; values may move in either direction.
#[derive(Debug, Clone)]
pub struct Gauge {
    family: Arc<MetricFamily>,
}

impl Gauge {
    pub(crate) fn new(family: Arc<MetricFamily>) -> Self {
        Self { family }
    }

    pub fn family(&self) -> &MetricFamily {
        &self.family
    }

    pub fn set(&self, label_values: &[&str], value: f64) -> Result<()> {
        self.family.cell(label_values)?.set(value);
        Ok(())
    }

    pub fn add(&self, label_values: &[&str], delta: f64) -> Result<()> {
        self.family.cell(label_values)?.add(delta);
        Ok(())
    }

    pub fn inc(&self, label_values: &[&str]) -> Result<()> {
        self.add(label_values, 1.0)
    }

    pub fn dec(&self, label_values: &[&str]) -> Result<()> {
        self.add(label_values, -1.0)
    }

    /// Current value; 0 for a label tuple never used.
    pub fn value(&self, label_values: &[&str]) -> Result<f64> {
        Ok(self.family.peek(label_values)?.unwrap_or(0.0))
    }

    pub fn with_label_values(&self, label_values: &[&str]) -> Result<BoundGauge> {
        Ok(BoundGauge {
            cell: self.family.cell(label_values)?,
        })
    }
}

/// Gauge cell for one label tuple.
#[derive(Debug, Clone)]
pub struct BoundGauge {
    cell: Arc<Cell>,
}

impl BoundGauge {
    pub fn set(&self, value: f64) {
        self.cell.set(value);
    }

    pub fn add(&self, delta: f64) {
        self.cell.add(delta);
    }

    pub fn value(&self) -> f64 {
        self.cell.get()
    }
}
