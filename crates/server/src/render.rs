//! HTML assembly for the landing page. Markup only; the drawer behavior
//! itself lives in the client-side overlay controller.

use std::fmt::Write as _;

use shared::domain::{DrawerId, SiteContent};

/// Sentinel shown when the view counter row is absent or unreadable.
const UNKNOWN_VIEWS: &str = "?";

pub fn render_page(content: &SiteContent, views: Option<u64>) -> String {
    let mut html = String::with_capacity(8 * 1024);

    let title = escape_html(&content.profile.display_name);
    let _ = write!(
        html,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body>\n<main id=\"main\" tabindex=\"-1\">\n"
    );

    // The language switch itself is external; only its mount point is ours.
    let _ = write!(
        html,
        "<header><h1><a href=\"/\">{}</a></h1>\
         <div id=\"language-switch\"></div></header>\n",
        escape_html(&content.profile.display_name)
    );

    let views_badge = views
        .map(|v| v.to_string())
        .unwrap_or_else(|| UNKNOWN_VIEWS.to_string());
    let _ = write!(
        html,
        "<div class=\"intro\">\n<span class=\"tagline\">{}</span>\n\
         <span class=\"page-views\">{views_badge} page views</span>\n",
        escape_html(&content.profile.tagline)
    );
    for paragraph in &content.profile.bio {
        let _ = write!(html, "<p>{}</p>\n", escape_html(paragraph));
    }
    html.push_str("</div>\n");

    html.push_str("<nav class=\"links\">\n");
    for link in &content.links {
        let _ = write!(
            html,
            "<a href=\"{}\" rel=\"noreferrer noopener\">{}</a>\n",
            escape_html(&link.url),
            escape_html(&link.label)
        );
    }
    html.push_str("</nav>\n");

    let _ = write!(
        html,
        "<footer>{}</footer>\n",
        escape_html(&content.profile.footer)
    );

    render_floating_nav(&mut html);
    render_work_drawer(&mut html, content);
    render_contact_drawer(&mut html);

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_floating_nav(html: &mut String) {
    let work = DrawerId::Work.slug();
    let contact = DrawerId::Contact.slug();
    let _ = write!(
        html,
        "<nav class=\"floating\">\n\
         <a href=\"/\" title=\"Home\">Home</a>\n\
         <button id=\"trigger-{work}\" data-drawer-trigger=\"{work}\" \
         title=\"Featured projects\">Work</button>\n\
         <button id=\"trigger-{contact}\" data-drawer-trigger=\"{contact}\" \
         title=\"Send a message\">Message</button>\n\
         </nav>\n"
    );
}

fn render_work_drawer(html: &mut String, content: &SiteContent) {
    let _ = write!(
        html,
        "<section hidden data-drawer=\"{}\" role=\"dialog\" aria-modal=\"true\">\n\
         <h2>Work</h2>\n<ul class=\"projects\">\n",
        DrawerId::Work.slug()
    );
    for project in &content.projects {
        let _ = write!(
            html,
            "<li><h3>{}</h3><p>{}</p><span class=\"tags\">{}</span>",
            escape_html(&project.name),
            escape_html(&project.summary),
            escape_html(&project.tags.join(" \u{2022} "))
        );
        if let Some(url) = &project.live_url {
            let _ = write!(html, "<a href=\"{}\">View live</a>", escape_html(url));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n</section>\n");
}

fn render_contact_drawer(html: &mut String) {
    let _ = write!(
        html,
        "<section hidden data-drawer=\"{}\" role=\"dialog\" aria-modal=\"true\">\n\
         <h2>Send a message</h2>\n\
         <form method=\"post\" action=\"/api/messages\">\n\
         <textarea name=\"body\" maxlength=\"4000\" required></textarea>\n\
         <input name=\"reply_to\" placeholder=\"How can I reach you back?\">\n\
         <button type=\"submit\">Send</button>\n\
         </form>\n</section>\n",
        DrawerId::Contact.slug()
    );
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
