//! HTML rendering for page view-models.
//!
//! Every page is a content template nested inside [`BASE_TEMPLATE`]. The
//! content element carries `data-template` with the template name.

use crate::web::views::{CookieStandDetailPage, CookieStandListPage, LoginPage};
use std::fmt::Write;

pub const BASE_TEMPLATE: &str = "base.html";

/// A view-model that renders into the base layout
pub trait Template {
    const NAME: &'static str;

    fn title(&self) -> String;

    fn render_content(&self, out: &mut String);
}

/// Escape text for an HTML body or a quoted attribute
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a page inside the base layout. `username` is the signed-in user, if any.
pub fn render<T: Template>(page: &T, username: Option<&str>) -> String {
    let mut content = String::new();
    page.render_content(&mut content);

    let nav = match username {
        Some(name) => format!(
            "<span class=\"user\">{}</span>\
             <form method=\"post\" action=\"/accounts/logout/\"><button type=\"submit\">Log out</button></form>",
            escape(name)
        ),
        None => "<a href=\"/accounts/login/\">Log in</a>".to_string(),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\" data-layout=\"{base}\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <header><a href=\"/\">Cookie Stands</a> {nav}</header>\n\
         <main data-template=\"{name}\">\n{content}</main>\n\
         </body>\n\
         </html>\n",
        base = BASE_TEMPLATE,
        title = escape(&page.title()),
        nav = nav,
        name = T::NAME,
        content = content,
    )
}

impl Template for CookieStandListPage {
    const NAME: &'static str = "cookie_stands/thing_list.html";

    fn title(&self) -> String {
        "Cookie Stands".to_string()
    }

    fn render_content(&self, out: &mut String) {
        out.push_str("<h1>Cookie Stands</h1>\n");
        if self.object_list.is_empty() {
            out.push_str("<p>No cookie stands reviewed yet.</p>\n");
            return;
        }
        out.push_str("<ul class=\"cookie-stands\">\n");
        for stand in &self.object_list {
            let _ = writeln!(
                out,
                "<li><a href=\"/{id}/\">{name}</a> rated {rating} by {reviewer}</li>",
                id = stand.id,
                name = escape(&stand.name),
                rating = stand.rating,
                reviewer = escape(&stand.reviewer.username),
            );
        }
        out.push_str("</ul>\n");
    }
}

impl Template for CookieStandDetailPage {
    const NAME: &'static str = "cookie_stands/thing_detail.html";

    fn title(&self) -> String {
        self.cookie_stand.name.clone()
    }

    fn render_content(&self, out: &mut String) {
        let stand = &self.cookie_stand;
        let _ = write!(
            out,
            "<article class=\"cookie-stand\">\n\
             <h1>{name}</h1>\n\
             <p class=\"rating\">Rating: {rating}</p>\n\
             <p class=\"reviewer\">Reviewer: {reviewer}</p>\n\
             <p class=\"description\">{description}</p>\n\
             </article>\n\
             <a href=\"/\">Back to list</a>\n",
            name = escape(&stand.name),
            rating = stand.rating,
            reviewer = escape(&stand.reviewer.username),
            description = escape(&stand.description),
        );
    }
}

impl Template for LoginPage {
    const NAME: &'static str = "registration/login.html";

    fn title(&self) -> String {
        "Log in".to_string()
    }

    fn render_content(&self, out: &mut String) {
        out.push_str("<h1>Log in</h1>\n");
        if let Some(error) = &self.error {
            let _ = writeln!(out, "<p class=\"error\">{}</p>", escape(error));
        }
        let _ = write!(
            out,
            "<form method=\"post\" action=\"/accounts/login/\">\n\
             <input type=\"hidden\" name=\"next\" value=\"{next}\">\n\
             <label>Username <input type=\"text\" name=\"username\" value=\"{username}\"></label>\n\
             <label>Password <input type=\"password\" name=\"password\"></label>\n\
             <button type=\"submit\">Log in</button>\n\
             </form>\n",
            next = escape(&self.next),
            username = escape(&self.username),
        );
    }
}
