//! Drafting domain models

/// Tone of voice for generated email copy.
///
/// Unrecognised labels fall back to [`Tone::Professional`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    /// Professional and business-like
    #[default]
    Professional,

    /// Casual and relaxed
    Casual,

    /// Warm and friendly
    Friendly,

    /// Formal and respectful
    Formal,

    /// Persuasive and compelling
    Persuasive,
}

impl Tone {
    /// The lowercase label for this tone
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Friendly => "friendly",
            Tone::Formal => "formal",
            Tone::Persuasive => "persuasive",
        }
    }

    /// How this tone is described to the model
    pub fn description(&self) -> &'static str {
        match self {
            Tone::Professional => "professional and business-like",
            Tone::Casual => "casual and relaxed",
            Tone::Friendly => "warm and friendly",
            Tone::Formal => "formal and respectful",
            Tone::Persuasive => "persuasive and compelling",
        }
    }
}

impl From<&str> for Tone {
    fn from(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "casual" => Tone::Casual,
            "friendly" => Tone::Friendly,
            "formal" => Tone::Formal,
            "persuasive" => Tone::Persuasive,
            _ => Tone::Professional,
        }
    }
}

/// Target length of generated email copy.
///
/// Unrecognised labels fall back to [`DraftLength::Medium`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DraftLength {
    /// 2-3 sentences
    Short,

    /// 1-2 paragraphs
    #[default]
    Medium,

    /// 3-4 paragraphs
    Long,
}

impl DraftLength {
    /// The lowercase label for this length
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftLength::Short => "short",
            DraftLength::Medium => "medium",
            DraftLength::Long => "long",
        }
    }

    /// How this length is described to the model
    pub fn description(&self) -> &'static str {
        match self {
            DraftLength::Short => "2-3 sentences",
            DraftLength::Medium => "1-2 paragraphs",
            DraftLength::Long => "3-4 paragraphs",
        }
    }
}

impl From<&str> for DraftLength {
    fn from(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "short" => DraftLength::Short,
            "long" => DraftLength::Long,
            _ => DraftLength::Medium,
        }
    }
}

/// Output format for generated email copy.
///
/// Unrecognised labels fall back to [`DraftFormat::Html`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DraftFormat {
    /// Simple HTML body content
    #[default]
    Html,

    /// Plain text without markup
    Plain,
}

impl DraftFormat {
    /// The lowercase label for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftFormat::Html => "html",
            DraftFormat::Plain => "plain",
        }
    }
}

impl From<&str> for DraftFormat {
    fn from(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "plain" => DraftFormat::Plain,
            _ => DraftFormat::Html,
        }
    }
}

/// The kind of revision to apply to existing email copy.
///
/// Unrecognised labels fall back to [`Improvement::Clarity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Improvement {
    /// Fix grammar and spelling errors
    Grammar,

    /// Improve clarity and readability
    #[default]
    Clarity,

    /// Adjust the overall tone, optionally towards a target tone
    Tone,

    /// Make the copy more persuasive
    Persuasiveness,

    /// Tighten the copy without losing the message
    Brevity,
}

impl Improvement {
    /// The lowercase label for this improvement
    pub fn as_str(&self) -> &'static str {
        match self {
            Improvement::Grammar => "grammar",
            Improvement::Clarity => "clarity",
            Improvement::Tone => "tone",
            Improvement::Persuasiveness => "persuasiveness",
            Improvement::Brevity => "brevity",
        }
    }

    /// How this improvement is described to the model
    pub fn description(&self, target_tone: Option<Tone>) -> String {
        match self {
            Improvement::Grammar => "fix grammar and spelling errors".to_string(),
            Improvement::Clarity => "improve clarity and readability".to_string(),
            Improvement::Tone => match target_tone {
                Some(tone) => format!("adjust the tone to be more {}", tone.as_str()),
                None => "improve the overall tone".to_string(),
            },
            Improvement::Persuasiveness => "make it more persuasive and compelling".to_string(),
            Improvement::Brevity => "make it more concise while keeping the key message".to_string(),
        }
    }
}

impl From<&str> for Improvement {
    fn from(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "grammar" => Improvement::Grammar,
            "tone" => Improvement::Tone,
            "persuasiveness" => Improvement::Persuasiveness,
            "brevity" => Improvement::Brevity,
            _ => Improvement::Clarity,
        }
    }
}

/// A subject and HTML body pair generated for a bulk campaign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkTemplate {
    /// Subject line template, possibly containing placeholders
    pub subject: String,

    /// HTML body template, possibly containing placeholders
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_labels_fall_back_to_defaults() {
        assert_eq!(Tone::from("bombastic"), Tone::Professional);
        assert_eq!(DraftLength::from("gigantic"), DraftLength::Medium);
        assert_eq!(DraftFormat::from("markdown"), DraftFormat::Html);
        assert_eq!(Improvement::from("sparkle"), Improvement::Clarity);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(Tone::from("Friendly"), Tone::Friendly);
        assert_eq!(DraftLength::from("SHORT"), DraftLength::Short);
        assert_eq!(DraftFormat::from("Plain"), DraftFormat::Plain);
        assert_eq!(Improvement::from("Brevity"), Improvement::Brevity);
    }

    #[test]
    fn test_tone_improvement_description_uses_target_tone() {
        assert_eq!(
            Improvement::Tone.description(Some(Tone::Casual)),
            "adjust the tone to be more casual"
        );
        assert_eq!(
            Improvement::Tone.description(None),
            "improve the overall tone"
        );
        assert_eq!(
            Improvement::Grammar.description(Some(Tone::Casual)),
            "fix grammar and spelling errors"
        );
    }
}
