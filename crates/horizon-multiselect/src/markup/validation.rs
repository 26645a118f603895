//! Unobtrusive-validation attributes for emitted markup.

/// A validation rule attached to an emitted control.
///
/// Each rule renders as `data-val-{adapter}="message"` plus its parameter
/// attributes. A `None` message falls back to a default built from the
/// field's display name.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupRule {
    Required { message: Option<String> },
    MinLength { length: usize, message: Option<String> },
    MaxLength { length: usize, message: Option<String> },
    Range { min: f64, max: f64, message: Option<String> },
    Regex { pattern: String, message: Option<String> },
    /// Must equal the field named `other`.
    EqualTo { other: String, message: Option<String> },
    /// Any other adapter, emitted as `data-val-{name}`.
    Custom { name: String, message: Option<String> },
}

impl MarkupRule {
    pub fn required() -> Self {
        Self::Required { message: None }
    }

    pub fn min_length(length: usize) -> Self {
        Self::MinLength { length, message: None }
    }

    pub fn max_length(length: usize) -> Self {
        Self::MaxLength { length, message: None }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::Range { min, max, message: None }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            message: None,
        }
    }

    pub fn equal_to(other: impl Into<String>) -> Self {
        Self::EqualTo {
            other: other.into(),
            message: None,
        }
    }

    /// A rule for a host-defined adapter. The name is lowercased.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom {
            name: name.into().to_lowercase(),
            message: None,
        }
    }

    /// Set an explicit error message.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            Self::Required { message }
            | Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Range { message, .. }
            | Self::Regex { message, .. }
            | Self::EqualTo { message, .. }
            | Self::Custom { message, .. } => *message = text,
        }
        self
    }

    /// The adapter name used in `data-val-{adapter}`.
    pub fn adapter(&self) -> &str {
        match self {
            Self::Required { .. } => "required",
            Self::MinLength { .. } => "minlength",
            Self::MaxLength { .. } => "maxlength",
            Self::Range { .. } => "range",
            Self::Regex { .. } => "regex",
            Self::EqualTo { .. } => "equalto",
            Self::Custom { name, .. } => name,
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            Self::Required { message }
            | Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Range { message, .. }
            | Self::Regex { message, .. }
            | Self::EqualTo { message, .. }
            | Self::Custom { message, .. } => message.as_deref(),
        }
    }

    /// The message shown when the rule fails for `display_name`.
    pub fn error_message(&self, display_name: &str) -> String {
        if let Some(message) = self.message() {
            return message.to_string();
        }
        match self {
            Self::Required { .. } => format!("The {display_name} field is required."),
            Self::MinLength { length, .. } => {
                format!("The field {display_name} must have a minimum length of '{length}'.")
            }
            Self::MaxLength { length, .. } => {
                format!("The field {display_name} must have a maximum length of '{length}'.")
            }
            Self::Range { min, max, .. } => {
                format!("The field {display_name} must be between {min} and {max}.")
            }
            Self::Regex { pattern, .. } => {
                format!("The field {display_name} must match the regular expression '{pattern}'.")
            }
            Self::EqualTo { other, .. } => format!("'{display_name}' and '{other}' do not match."),
            Self::Custom { .. } => format!("The field {display_name} is invalid."),
        }
    }

    /// The attributes this rule contributes, unescaped, in emission order.
    pub fn attributes(&self, display_name: &str) -> Vec<(String, String)> {
        let adapter = self.adapter();
        let mut attrs = vec![(format!("data-val-{adapter}"), self.error_message(display_name))];
        match self {
            Self::MinLength { length, .. } => attrs.push(("data-val-minlength-min".into(), length.to_string())),
            Self::MaxLength { length, .. } => attrs.push(("data-val-maxlength-max".into(), length.to_string())),
            Self::Range { min, max, .. } => {
                attrs.push(("data-val-range-min".into(), min.to_string()));
                attrs.push(("data-val-range-max".into(), max.to_string()));
            }
            Self::Regex { pattern, .. } => attrs.push(("data-val-regex-pattern".into(), pattern.clone())),
            Self::EqualTo { other, .. } => attrs.push(("data-val-equalto-other".into(), format!("*.{other}"))),
            Self::Required { .. } | Self::Custom { .. } => {}
        }
        attrs
    }
}

/// All validation attributes for `rules`, followed by `data-val="true"` when
/// there is at least one rule.
pub fn validation_attributes(rules: &[MarkupRule], display_name: &str) -> Vec<(String, String)> {
    let mut attrs: Vec<(String, String)> = rules
        .iter()
        .flat_map(|rule| rule.attributes(display_name))
        .collect();
    if !rules.is_empty() {
        attrs.push(("data-val".into(), "true".into()));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        assert_eq!(
            MarkupRule::required().error_message("Tags"),
            "The Tags field is required."
        );
        assert_eq!(
            MarkupRule::range(1.0, 5.0).error_message("Tags"),
            "The field Tags must be between 1 and 5."
        );
        assert_eq!(
            MarkupRule::equal_to("Other").error_message("Tags"),
            "'Tags' and 'Other' do not match."
        );
        assert_eq!(
            MarkupRule::required().with_message("Pick one").error_message("Tags"),
            "Pick one"
        );
    }

    #[test]
    fn test_attributes() {
        let attrs = validation_attributes(
            &[MarkupRule::min_length(2), MarkupRule::equal_to("Confirm"), MarkupRule::custom("NoSpam")],
            "Tags",
        );
        let names: Vec<&str> = attrs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "data-val-minlength",
                "data-val-minlength-min",
                "data-val-equalto",
                "data-val-equalto-other",
                "data-val-nospam",
                "data-val",
            ]
        );
        assert_eq!(attrs[1].1, "2");
        assert_eq!(attrs[3].1, "*.Confirm");
    }

    #[test]
    fn test_no_rules_no_flag() {
        assert!(validation_attributes(&[], "Tags").is_empty());
    }
}
