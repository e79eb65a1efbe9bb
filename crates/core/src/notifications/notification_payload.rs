//! Builds the staff notification email from durable profile state.

use std::fmt::Write as _;

use serde_json::Value;

use crate::email::{AdminRecipients, EmailMessage};
use crate::household::{HouseholdMember, HouseholdWithMembers};
use crate::profiles::{ProfileSection, TaxProfile};

/// Renders the profile-update email for one batch.
///
/// Only `updated_sections` comes from the client, and only as an annotation:
/// every value in the message is read from the stored profile and household.
pub fn build_profile_update_email(
    recipients: &AdminRecipients,
    batch_id: &str,
    updated_sections: &[String],
    profile: &TaxProfile,
    household: &HouseholdWithMembers,
) -> EmailMessage {
    let display_name = profile
        .full_name
        .clone()
        .unwrap_or_else(|| profile.email.clone());
    let updated_labels: Vec<String> = updated_sections.iter().map(|s| section_label(s)).collect();

    let mut text = String::new();
    let _ = writeln!(text, "{} ({}) updated their tax profile.", display_name, profile.email);
    let _ = writeln!(text);
    if updated_labels.is_empty() {
        let _ = writeln!(text, "Updated sections: (not specified)");
    } else {
        let _ = writeln!(text, "Updated sections: {}", updated_labels.join(", "));
    }
    let _ = writeln!(text, "Batch: {}", batch_id);

    let _ = writeln!(text, "\n== Contact ==");
    let _ = writeln!(text, "Name: {}", profile.full_name.as_deref().unwrap_or("-"));
    let _ = writeln!(text, "Email: {}", profile.email);
    let _ = writeln!(text, "Phone: {}", profile.phone.as_deref().unwrap_or("-"));

    let mut html = String::new();
    let _ = write!(
        html,
        "<p><strong>{}</strong> ({}) updated their tax profile.</p>",
        escape_html(&display_name),
        escape_html(&profile.email)
    );
    let _ = write!(html, "<p>Updated sections: {}</p>", escape_html(&updated_labels.join(", ")));

    for section in ProfileSection::ALL {
        if section == ProfileSection::Household {
            continue;
        }
        let Some(document) = profile.section(section) else {
            continue;
        };
        let marker = if updated_sections.iter().any(|s| s == section.as_str()) {
            " (updated)"
        } else {
            ""
        };
        let _ = writeln!(text, "\n== {}{} ==", section.label(), marker);
        let _ = write!(html, "<h3>{}{}</h3><ul>", section.label(), marker);
        for (field, value) in flatten_document(document) {
            let _ = writeln!(text, "{}: {}", field, value);
            let _ = write!(
                html,
                "<li>{}: {}</li>",
                escape_html(&field),
                escape_html(&value)
            );
        }
        let _ = write!(html, "</ul>");
    }

    let members_marker = if updated_sections
        .iter()
        .any(|s| s == ProfileSection::Household.as_str())
    {
        " (updated)"
    } else {
        ""
    };
    let _ = writeln!(
        text,
        "\n== Household members ({}){} ==",
        household.members.len(),
        members_marker
    );
    let _ = write!(
        html,
        "<h3>Household members ({}){}</h3><ul>",
        household.members.len(),
        members_marker
    );
    if household.members.is_empty() {
        let _ = writeln!(text, "(none)");
    }
    for member in &household.members {
        let line = describe_member(member);
        let _ = writeln!(text, "- {}", line);
        let _ = write!(html, "<li>{}</li>", escape_html(&line));
    }
    let _ = write!(html, "</ul>");

    EmailMessage {
        from: recipients.from.clone(),
        to: recipients.to.clone(),
        reply_to: Some(profile.email.clone()),
        subject: format!("Profile updated: {}", display_name),
        text,
        html: Some(html),
    }
}

fn section_label(name: &str) -> String {
    name.parse::<ProfileSection>()
        .map(|section| section.label().to_string())
        .unwrap_or_else(|_| name.to_string())
}

fn describe_member(member: &HouseholdMember) -> String {
    let mut line = format!(
        "{} {}, {}",
        member.first_name, member.last_name, member.relationship
    );
    if let Some(dob) = member.date_of_birth {
        let _ = write!(line, ", born {}", dob);
    }
    if member.is_dependent {
        line.push_str(", dependent");
    }
    if let Some(notes) = member.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let _ = write!(line, " ({})", notes.trim());
    }
    line
}

/// Flattens a section document one level deep into `field: value` pairs.
/// Nested structures are rendered as compact JSON.
fn flatten_document(document: &Value) -> Vec<(String, String)> {
    match document {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect(),
        other => vec![("value".to_string(), render_value(other))],
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
        other => other.to_string(),
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
