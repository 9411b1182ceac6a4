use std::fmt::Display;

/// Placeholder method tag for families that are not classified by HTTP
/// method (system, user, purchase, auth).
pub const NO_METHOD: &str = "none";

/// Renders one sample as `<family>,source=<src>,method=<m> <field>=<value>`.
///
/// Identifiers must not contain commas or spaces; that is the caller's
/// responsibility. Values are rendered with their default formatting, so
/// floats keep full precision — round before encoding if needed.
pub fn encode_line(
    family: &str,
    source: &str,
    method: &str,
    field: &str,
    value: impl Display,
) -> String {
    format!("{family},source={source},method={method} {field}={value}")
}

/// Ordered set of encoded lines for a single reporting cycle. Created
/// fresh per cycle, rendered once, then discarded.
pub struct MetricBuffer {
    source: String,
    lines: Vec<String>,
}

impl MetricBuffer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lines: Vec::new(),
        }
    }

    pub fn add(&mut self, family: &str, method: &str, field: &str, value: impl Display) {
        self.append(encode_line(family, &self.source, method, field, value));
    }

    pub fn append(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self, separator: &str) -> String {
        self.lines.join(separator)
    }
}
