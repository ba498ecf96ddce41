//! Template expansion

use crate::domain::campaigns::RecipientRecord;

const NAME_FALLBACK: &str = "Valued Customer";

/// Expand every `{{placeholder}}` in a template against one recipient.
///
/// `{{email}}` and `{{name}}` are always available; a missing or empty name
/// falls back to a fixed placeholder. Each custom field substitutes its
/// `{{key}}`, matched exactly as stored. Placeholders with no matching
/// field are left verbatim.
pub fn expand(template: &str, recipient: &RecipientRecord) -> String {
    let mut content = template.replace("{{email}}", recipient.email.as_str());

    let name = recipient
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(NAME_FALLBACK);

    content = content.replace("{{name}}", name);

    let mut keys: Vec<&String> = recipient.custom_fields.keys().collect();
    keys.sort();

    for key in keys {
        content = content.replace(&format!("{{{{{key}}}}}"), &recipient.custom_fields[key]);
    }

    content
}
