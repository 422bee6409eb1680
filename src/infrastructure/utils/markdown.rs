use ammonia::{Builder, UrlRelative};
use pulldown_cmark::{html, Options, Parser};

/// Renders a project description to HTML with anything unsafe stripped.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, options);

    let mut raw_html = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut raw_html, parser);

    sanitize_html(&raw_html)
}

pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::Deny)
        .clean(content)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_basic_markdown() {
        let html = safe_markdown_to_html("**PETG** bracket\n\n- 0.2 mm layers");
        assert!(html.contains("<strong>PETG</strong>"));
        assert!(html.contains("<li>0.2 mm layers</li>"));
    }

    #[test]
    fn strips_scripts_and_handlers() {
        let html = safe_markdown_to_html("<script>alert(1)</script><img src=\"https://x.cz/a.png\" onerror=\"x()\">");
        assert!(!html.contains("<script"));
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn links_get_safe_rel() {
        let html = safe_markdown_to_html("[Printables](https://www.printables.com/model/1)");
        assert!(html.contains("rel=\"nofollow noopener noreferrer\""));
    }

    #[test]
    fn blank_input_renders_nothing() {
        assert_eq!(safe_markdown_to_html("   "), "");
    }
}
