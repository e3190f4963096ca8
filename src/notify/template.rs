use crate::models::RsvpStatus;

/// `{base}/{guest_id}/{token}`
pub fn rsvp_link(base_url: &str, guest_id: &str, status: RsvpStatus) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        guest_id,
        status.token()
    )
}

pub fn subject(event_id: &str) -> String {
    format!("Invitation to {}", event_id)
}

pub fn invitation_html(base_url: &str, guest_id: &str, event_id: &str) -> String {
    let links = RsvpStatus::ALL
        .into_iter()
        .map(|status| {
            format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(&rsvp_link(base_url, guest_id, status)),
                status.label()
            )
        })
        .collect::<Vec<_>>()
        .join(" |\n");

    format!(
        "<h1>You're Invited!</h1>\n<p>Event: {}</p>\n<p>Click below to RSVP:</p>\n{}\n",
        escape_html(event_id),
        links
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
