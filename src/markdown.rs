use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use scraper::{Html, Selector};

use crate::images::{Fit, ImageUrlBuilder};

const INLINE_IMAGE_WIDTH: u32 = 1200;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_MATH);
    options
}

pub fn render_markdown_to_html(markdown: &str) -> String {
    render(markdown, None)
}

/// Like [`render_markdown_to_html`], but image sources go through the URL builder.
pub fn render_post_body(markdown: &str, images: &ImageUrlBuilder) -> String {
    render(markdown, Some(images))
}

fn render(markdown: &str, images: Option<&ImageUrlBuilder>) -> String {
    let normalized_markdown = normalize_latex_delimiters(markdown);
    let parser = Parser::new_ext(&normalized_markdown, markdown_options()).map(|event| match event {
        Event::InlineMath(math) => Event::Html(CowStr::Boxed(render_math_html(&math, false).into_boxed_str())),
        Event::DisplayMath(math) => Event::Html(CowStr::Boxed(render_math_html(&math, true).into_boxed_str())),
        Event::Start(Tag::Image { link_type, dest_url, title, id }) => {
            let dest_url = match images {
                Some(builder) => CowStr::from(
                    builder
                        .image(&dest_url)
                        .width(INLINE_IMAGE_WIDTH)
                        .fit(Fit::Max)
                        .url(),
                ),
                None => dest_url,
            };
            Event::Start(Tag::Image { link_type, dest_url, title, id })
        }
        other => other,
    });

    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

/// Plain text of the first paragraph, used when a post has no description.
pub fn first_paragraph_excerpt(markdown: &str) -> Option<String> {
    let rendered = render_markdown_to_html(markdown);
    let fragment = Html::parse_fragment(&rendered);
    let selector = Selector::parse("p").ok()?;

    fragment
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|text| !text.is_empty())
}

fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((open, close, display_mode)) = delimiter_at(input, i) {
            let content_start = i + open.len();
            if let Some(close_at) = input[content_start..].find(close) {
                let content_end = content_start + close_at;
                let content = &input[content_start..content_end];
                if display_mode || content.contains('\n') {
                    out.push_str("$$");
                    out.push_str(content);
                    out.push_str("$$");
                } else {
                    out.push('$');
                    out.push_str(content);
                    out.push('$');
                }
                i = content_end + close.len();
                continue;
            }
        }

        if let Some(ch) = input[i..].chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        } else {
            break;
        }
    }

    out
}

fn delimiter_at(input: &str, index: usize) -> Option<(&'static str, &'static str, bool)> {
    let tail = &input[index..];
    if tail.starts_with("\\(") {
        Some(("\\(", "\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\[", "\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let mut opts = katex::Opts::builder();
    opts.display_mode(display_mode);

    let rendered = match opts.build() {
        Ok(opts) => katex::render_with_opts(source, opts),
        Err(_) => return fallback_math_html(source, display_mode),
    };

    match rendered {
        Ok(html) => html,
        Err(_) => fallback_math_html(source, display_mode),
    }
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    format!(
        "<span class=\"{class_name}\">{}</span>",
        htmlescape::encode_minimal(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageSettings;

    #[test]
    fn renders_math_with_latex_paren_and_bracket_delimiters() {
        let input = "\\(x^2\\) and \\[y^2\\]";
        let output = render_markdown_to_html(input);
        assert!(output.contains("katex"));
    }

    #[test]
    fn renders_multiline_paren_delimited_math() {
        let input = "Start \\( \\frac{2.24T}{2.08T}\n\\approx 1.077 \\) end";
        let output = render_markdown_to_html(input);
        assert!(output.contains("katex"));
    }

    #[test]
    fn renders_math_from_bundled_post() {
        let post = include_str!("../content/posts/signal-to-noise.md");
        let output = render_markdown_to_html(post);
        assert!(output.contains("katex"));
    }

    #[test]
    fn renders_headings_lists_code_and_quotes() {
        let output = render_markdown_to_html("## Title\n\n- one\n\n> quoted\n\n```rust\nfn main() {}\n```\n");
        assert!(output.contains("<h2>Title</h2>"));
        assert!(output.contains("<li>one</li>"));
        assert!(output.contains("<blockquote>"));
        assert!(output.contains("language-rust"));
    }

    #[test]
    fn inline_images_go_through_the_url_builder() {
        let images = ImageUrlBuilder::new(&ImageSettings {
            project_id: Some("proj1".to_string()),
            ..ImageSettings::default()
        });
        let output = render_post_body("![shot](image-abc-800x600-png)", &images);
        assert!(output.contains(
            "src=\"https://cdn.sanity.io/images/proj1/production/abc-800x600.png?w=1200&amp;fit=max\""
        ));
        let output = render_post_body("![local](/static/a.png)", &images);
        assert!(output.contains("src=\"/static/a.png\""));
    }

    #[test]
    fn excerpt_is_first_non_empty_paragraph() {
        let excerpt = first_paragraph_excerpt("# Heading\n\nFirst *para*\nwraps here.\n\nSecond.");
        assert_eq!(excerpt.as_deref(), Some("First para wraps here."));
        assert_eq!(first_paragraph_excerpt("# Only heading"), None);
    }
}
