//! Help text rendering.

use crate::spec::{ArgumentSpec, ArgumentsSpecification};
use crate::value::Value;

/// Render the help block: `usage`, then one paragraph per argument in
/// declaration order, separated by blank lines.
pub fn render(usage: &str, specification: &ArgumentsSpecification) -> String {
    let mut sections = Vec::with_capacity(specification.len() + 1);
    sections.push(usage.to_string());
    sections.extend(
        specification
            .iter()
            .map(|(long_name, spec)| paragraph(long_name, spec)),
    );
    sections.join("\n\n")
}

fn paragraph(long_name: &str, spec: &ArgumentSpec) -> String {
    let mut out = format!("--{long_name}");
    if let Some(short) = spec.short_name {
        out.push_str(&format!(", -{short}"));
    }

    out.push_str(&format!("\n[{}]", spec.kind.type_name()));
    match &spec.default_value {
        Some(Value::Text(text)) => out.push_str(&format!(" [default: \"{text}\"]")),
        Some(other) => out.push_str(&format!(" [default: {other}]")),
        None => {}
    }

    if let Some(usage) = spec.usage.as_deref().filter(|u| !u.is_empty()) {
        out.push('\n');
        out.push_str(usage);
    }
    out
}
