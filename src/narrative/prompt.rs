use serde_json::Value;

/// One key the model must return, described for the output instructions.
#[derive(Debug, Clone, Copy)]
pub struct OutputField {
    pub name: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
}

/// Substitute `{{{name}}}` and `{{name}}` placeholders with values from a
/// JSON object. Unknown names render empty; an unterminated placeholder is
/// copied through verbatim.
pub fn render(template: &str, variables: &Value) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let (open, close) = if after.starts_with("{{{") {
            ("{{{", "}}}")
        } else {
            ("{{", "}}")
        };

        let body = &after[open.len()..];
        match body.find(close) {
            Some(end) => {
                let name = body[..end].trim();
                if let Some(value) = variables.get(name) {
                    push_value(&mut out, value);
                }
                rest = &body[end + close.len()..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Number(n) => match n.as_f64() {
            // Whole amounts read as "80000", not "80000.0".
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                out.push_str(&format!("{}", f as i64));
            }
            _ => out.push_str(&n.to_string()),
        },
        other => out.push_str(&other.to_string()),
    }
}

pub fn output_instructions(fields: &[OutputField]) -> String {
    let mut out = String::from(
        "Respond with a single JSON object and nothing else. It must contain exactly these keys:\n",
    );
    for field in fields {
        out.push_str("- \"");
        out.push_str(field.name);
        out.push_str("\" (");
        out.push_str(field.kind);
        out.push_str("): ");
        out.push_str(field.description);
        out.push('\n');
    }
    out
}

/// Rendered template followed by the JSON output contract.
pub fn build(template: &str, variables: &Value, fields: &[OutputField]) -> String {
    let mut prompt = render(template, variables);
    prompt.push_str("\n\n");
    prompt.push_str(&output_instructions(fields));
    prompt
}
