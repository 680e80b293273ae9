//! Label and relationship-type decoration.

/// How node labels and relationship types are rewritten during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOptions {
    pub decorate_node_labels: bool,
    pub decorate_edge_labels: bool,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            decorate_node_labels: true,
            decorate_edge_labels: true,
            prefix: None,
            suffix: None,
        }
    }
}

impl LabelOptions {
    /// Prefix and suffix to apply, or `None` when both are empty.
    fn decoration(&self) -> Option<(&str, &str)> {
        let prefix = self.prefix.as_deref().unwrap_or_default();
        let suffix = self.suffix.as_deref().unwrap_or_default();
        if prefix.is_empty() && suffix.is_empty() {
            None
        } else {
            Some((prefix, suffix))
        }
    }

    /// Decorate every label of a colon-delimited label string.
    ///
    /// `":A:B"` with prefix `p_` and suffix `_s` becomes `":p_A_s:p_B_s"`.
    /// Empty segments are dropped. Returns the input unchanged when node
    /// decoration is disabled, there is nothing to add, or the input is empty.
    pub fn transform_node_labels(&self, raw: &str) -> String {
        if !self.decorate_node_labels || raw.is_empty() {
            return raw.to_string();
        }
        let Some((prefix, suffix)) = self.decoration() else {
            return raw.to_string();
        };
        raw.split(':')
            .filter(|label| !label.is_empty())
            .map(|label| format!(":{prefix}{label}{suffix}"))
            .collect()
    }

    /// Decorate a relationship type. A leading colon is dropped first.
    pub fn transform_edge_label(&self, raw: &str) -> String {
        if !self.decorate_edge_labels || raw.is_empty() {
            return raw.to_string();
        }
        let Some((prefix, suffix)) = self.decoration() else {
            return raw.to_string();
        };
        format!("{prefix}{}{suffix}", relationship_type(raw))
    }
}

/// The relationship type of an edge label, without leading colons.
pub fn relationship_type(label: &str) -> &str {
    label.trim_start_matches(':')
}

/// Interpret a `--modify-*-labels` value: `false` (any case) and `0`
/// disable, everything else (including no value) enables.
pub fn parse_toggle(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(value) => !(value.eq_ignore_ascii_case("false") || value == "0"),
        None => true,
    }
}
