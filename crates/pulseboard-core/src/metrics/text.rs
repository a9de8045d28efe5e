//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use super::family::MetricFamily;

/// Content type served with a rendered registry.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Format a sample value the way Prometheus parses it.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

pub(super) fn encode_family(family: &MetricFamily, out: &mut String) {
    let name = family.name();
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(family.help()));
    let _ = writeln!(out, "# TYPE {} {}", name, family.kind().as_str());

    for (values, v) in family.samples() {
        if values.is_empty() {
            let _ = writeln!(out, "{} {}", name, format_value(v));
            continue;
        }
        let label_str = family
            .label_names()
            .iter()
            .zip(values.iter())
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}{{{}}} {}", name, label_str, format_value(v));
    }
}
