use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{PulseError, Result};

use super::family::{MetricFamily, MetricKind};
use super::handles::{Counter, Gauge};
use super::text;

/// The set of registered instruments, in registration order.
#[derive(Debug, Default)]
pub struct Registry {
    families: Vec<Arc<MetricFamily>>,
    names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instrument. Fails with `DuplicateName` on a name collision
    /// and `InvalidName` on a malformed metric or label name.
    pub fn register(
        &mut self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Arc<MetricFamily>> {
        if self.names.contains(name) {
            return Err(PulseError::DuplicateName(name.to_string()));
        }
        let family = Arc::new(MetricFamily::new(name, help, kind, label_names)?);
        self.names.insert(name.to_string());
        self.families.push(Arc::clone(&family));
        tracing::debug!(metric = %name, kind = kind.as_str(), labels = ?label_names, "metric registered");
        Ok(family)
    }

    pub fn register_counter(&mut self, name: &str, help: &str, label_names: &[&str]) -> Result<Counter> {
        self.register(name, help, MetricKind::Counter, label_names)
            .map(Counter::new)
    }

    pub fn register_gauge(&mut self, name: &str, help: &str, label_names: &[&str]) -> Result<Gauge> {
        self.register(name, help, MetricKind::Gauge, label_names)
            .map(Gauge::new)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &MetricFamily> {
        self.families.iter().map(|f| f.as_ref())
    }

    /// Render every instrument in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for family in &self.families {
            text::encode_family(family, &mut out);
        }
        out
    }
}
