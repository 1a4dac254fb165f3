//! Narrative templates
//!
//! Rendering is a pure function `(TemplateId, BoundValues) -> String`.
//! Placeholders use `{name}`; `{{` and `}}` emit literal braces.

use super::error::TemplateError;
use super::Tone;
use std::collections::BTreeMap;

/// Identifies one fixed template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    Opening(Tone),
    NoData,
    AverageHrv,
    StressContrast,
    Correlation,
    Mirror,
    Supporting,
    Closing(Tone),
    Summary,
    EmptySummary,
}

impl TemplateId {
    /// Template text
    pub fn text(&self) -> &'static str {
        match self {
            TemplateId::Opening(Tone::Professional) => {
                "Based on your query \"{query}\", here is what {record_count} readings tell us."
            }
            TemplateId::Opening(Tone::Casual) => {
                "You asked \"{query}\", so I looked through your last {record_count} readings."
            }
            TemplateId::Opening(Tone::Technical) => {
                "Query: \"{query}\". Sample size n={record_count} across {window_fields} fields."
            }
            TemplateId::NoData => {
                "There were no readings in the selected window, so the figures below are placeholders."
            }
            TemplateId::AverageHrv => {
                "Your HRV averaged {avg_hrv} ms while stress averaged {avg_stress}."
            }
            TemplateId::StressContrast => {
                "HRV averaged {low_hrv} ms in the {low_label} stress bucket versus {high_hrv} ms in the {high_label} bucket, a gap of {hrv_gap} ms."
            }
            TemplateId::Correlation => {
                "HRV and stress show a {corr_strength} {corr_direction} relationship (r = {hrv_stress_r})."
            }
            TemplateId::Mirror => {
                "Your coordination score sits at {coordination_score}/100. {energy_pattern}"
            }
            TemplateId::Supporting => "Supporting findings: {insight_list}.",
            TemplateId::Closing(Tone::Professional) => {
                "Continue monitoring these signals to confirm the pattern over time."
            }
            TemplateId::Closing(Tone::Casual) => "Keep logging and we'll see how this shifts.",
            TemplateId::Closing(Tone::Technical) => {
                "Re-run over a longer window to tighten these estimates."
            }
            TemplateId::Summary => "Analysis identified {insight_count} key insights: {top_insights}",
            TemplateId::EmptySummary => {
                "Data analysis completed with no significant findings in the selected window."
            }
        }
    }
}

/// Values available to placeholders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundValues {
    values: BTreeMap<&'static str, String>,
}

impl BoundValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: bind a value
    pub fn bind(mut self, key: &'static str, value: impl ToString) -> Self {
        self.values.insert(key, value.to_string());
        self
    }

    /// Builder: bind only when a value is present
    pub fn bind_opt<T: ToString>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.bind(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Check that every key is bound
    pub fn has_all(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.contains(k))
    }
}

/// Render a template with the bound values
pub fn render(id: TemplateId, values: &BoundValues) -> Result<String, TemplateError> {
    render_text(id.text(), values)
}

/// Render arbitrary template text
pub fn render_text(text: &str, values: &BoundValues) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len() + 64);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for k in chars.by_ref() {
                    if k == '}' {
                        closed = true;
                        break;
                    }
                    key.push(k);
                }
                if !closed || key.is_empty() {
                    return Err(TemplateError::Malformed(text.to_string()));
                }
                let value = values
                    .get(&key)
                    .ok_or_else(|| TemplateError::Unbound(key.clone()))?;
                out.push_str(value);
            }
            '}' => return Err(TemplateError::Malformed(text.to_string())),
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_values() {
        let values = BoundValues::new()
            .bind("query", "How is my HRV?")
            .bind("record_count", 15);
        let text = render(TemplateId::Opening(Tone::Professional), &values).unwrap();
        assert_eq!(
            text,
            "Based on your query \"How is my HRV?\", here is what 15 readings tell us."
        );
    }

    #[test]
    fn test_render_unbound_placeholder() {
        let err = render(TemplateId::AverageHrv, &BoundValues::new().bind("avg_hrv", 50)).unwrap_err();
        assert_eq!(err, TemplateError::Unbound("avg_stress".to_string()));
    }

    #[test]
    fn test_render_malformed() {
        let values = BoundValues::new().bind("a", 1);
        assert!(matches!(render_text("{a", &values), Err(TemplateError::Malformed(_))));
        assert!(matches!(render_text("{}", &values), Err(TemplateError::Malformed(_))));
        assert!(matches!(render_text("a}", &values), Err(TemplateError::Malformed(_))));
    }

    #[test]
    fn test_render_escaped_braces() {
        let values = BoundValues::new().bind("n", 3);
        assert_eq!(render_text("{{n}} = {n}", &values).unwrap(), "{n} = 3");
    }

    #[test]
    fn test_every_template_renders_when_bound() {
        let values = BoundValues::new()
            .bind("query", "q")
            .bind("record_count", 1)
            .bind("window_fields", 3)
            .bind("avg_hrv", 50)
            .bind("avg_stress", 25)
            .bind("low_hrv", 55)
            .bind("low_label", "Low")
            .bind("high_hrv", 40)
            .bind("high_label", "High")
            .bind("hrv_gap", 15)
            .bind("corr_strength", "strong")
            .bind("corr_direction", "negative")
            .bind("hrv_stress_r", -0.9)
            .bind("coordination_score", 70)
            .bind("energy_pattern", "Steady.")
            .bind("insight_list", "a; b")
            .bind("insight_count", 2)
            .bind("top_insights", "a; b");

        let ids = [
            TemplateId::Opening(Tone::Professional),
            TemplateId::Opening(Tone::Casual),
            TemplateId::Opening(Tone::Technical),
            TemplateId::NoData,
            TemplateId::AverageHrv,
            TemplateId::StressContrast,
            TemplateId::Correlation,
            TemplateId::Mirror,
            TemplateId::Supporting,
            TemplateId::Closing(Tone::Professional),
            TemplateId::Closing(Tone::Casual),
            TemplateId::Closing(Tone::Technical),
            TemplateId::Summary,
            TemplateId::EmptySummary,
        ];
        for id in ids {
            let text = render(id, &values).unwrap();
            assert!(!text.contains('{'), "{:?} left a placeholder: {}", id, text);
        }
    }
}
