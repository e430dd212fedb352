//! HTML fragments for each page, slotted into `layout.html`.

use htmlescape::encode_minimal;

use crate::images::{Fit, Format, ImageUrlBuilder};
use crate::listing::{tag_vocabulary, sorted_tags, ListState, ProjectFilter, TagFilter};
use crate::markdown::render_post_body;
use crate::models::{Post, Project};
use crate::session::{IntroSession, BOOT_LINES};

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

pub const BLOG_EMPTY_MARKER: &str = "NO_SIGNAL_FOUND";
pub const WORK_EMPTY_MARKER: &str = "NO_RESULTS_FOUND";

pub fn render_with_layout(
    layout: &str,
    title: &str,
    banner: &str,
    content: &str,
    is_development: bool,
) -> String {
    let mut page = layout
        .replace("{{ title }}", &encode_minimal(title))
        .replace("{{ banner }}", banner)
        .replace("{{ content }}", content);

    if is_development {
        page = page.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
    }

    page
}

fn display_date(post: &Post) -> String {
    post.published
        .map(|d| d.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| post.date.clone())
}

fn tag_list(tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let items: String = tags
        .iter()
        .map(|t| format!("<li class=\"tag\">#{}</li>", encode_minimal(t)))
        .collect();
    format!("<ul class=\"tags\">{items}</ul>")
}

fn project_card(project: &Project) -> String {
    format!(
        "<article class=\"project\">\
         <img src=\"{img}\" alt=\"{alt}\" loading=\"lazy\">\
         <span class=\"status\">{status}</span>\
         <h3><a href=\"{link}\">{title}</a></h3>\
         <p>{desc}</p>{tags}</article>",
        img = encode_minimal(&project.img),
        alt = encode_minimal(&project.title),
        status = encode_minimal(&project.status),
        link = encode_minimal(&project.link),
        title = encode_minimal(&project.title),
        desc = encode_minimal(&project.desc),
        tags = tag_list(&project.tags),
    )
}

pub fn home_fragment(home_html: &str, featured: &[Project], intro: IntroSession) -> String {
    let mut out = String::new();

    if !intro.intro_shown {
        out.push_str("<pre class=\"boot-sequence\">");
        for (text, status) in BOOT_LINES {
            out.push_str(&format!("<span class=\"boot-line\">[ {status} ] {text}</span>\n"));
        }
        out.push_str("</pre>");
    }

    out.push_str(home_html);
    out.push_str("<section class=\"selected-work\"><h2>SELECTED WORK</h2>");
    for project in featured {
        out.push_str(&project_card(project));
    }
    out.push_str("<a href=\"/work\">VIEW_ALL_PROJECTS</a></section>");
    out
}

fn work_href(query: &str, tag: Option<&str>) -> String {
    let mut params = Vec::new();
    if !query.is_empty() {
        params.push(format!("q={}", urlencoding::encode(query)));
    }
    if let Some(tag) = tag {
        params.push(format!("tag={}", urlencoding::encode(tag)));
    }
    if params.is_empty() {
        "/work".to_string()
    } else {
        format!("/work?{}", params.join("&"))
    }
}

pub fn work_fragment(projects: &[Project], filter: &ProjectFilter) -> String {
    let mut out = String::from("<section class=\"work\"><h1>ALL PROJECTS</h1>");

    out.push_str(&format!(
        "<form class=\"search\" method=\"get\" action=\"/work\">\
         <input type=\"search\" name=\"q\" value=\"{}\" placeholder=\"SEARCH_PROJECTS...\">",
        encode_minimal(&filter.query)
    ));
    if let Some(tag) = &filter.tag {
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"tag\" value=\"{}\">",
            encode_minimal(tag)
        ));
    }
    out.push_str("</form><nav class=\"tag-filter\">");

    let all_class = if filter.tag.is_none() { " active" } else { "" };
    out.push_str(&format!(
        "<a class=\"tag{all_class}\" href=\"{}\">ALL</a>",
        encode_minimal(&work_href(&filter.query, None))
    ));
    for tag in sorted_tags(projects) {
        // clicking the active tag clears it
        let (active, href) = if filter.tag.as_deref() == Some(tag.as_str()) {
            (" active", work_href(&filter.query, None))
        } else {
            ("", work_href(&filter.query, Some(&tag)))
        };
        out.push_str(&format!(
            "<a class=\"tag{active}\" href=\"{}\">{}</a>",
            encode_minimal(&href),
            encode_minimal(&tag)
        ));
    }
    out.push_str("</nav>");

    let found = filter.apply(projects);
    if found.is_empty() {
        out.push_str(&format!(
            "<p class=\"empty-state\">{WORK_EMPTY_MARKER}</p>\
             <a class=\"clear-filters\" href=\"/work\">CLEAR_FILTERS</a>"
        ));
    } else {
        out.push_str("<div class=\"projects\">");
        for project in found {
            out.push_str(&project_card(project));
        }
        out.push_str("</div>");
    }
    out.push_str("</section>");
    out
}

fn post_summary(post: &Post, images: &ImageUrlBuilder) -> String {
    let thumbnail = post
        .thumbnail
        .as_deref()
        .map(|src| {
            format!(
                "<img class=\"thumbnail\" src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                encode_minimal(
                    &images
                        .image(src)
                        .width(600)
                        .height(400)
                        .fit(Fit::Crop)
                        .format(Format::Webp)
                        .url()
                ),
                encode_minimal(&post.title)
            )
        })
        .unwrap_or_default();
    let avatar = match post.author_image.as_deref() {
        Some(src) => format!(
            "<img class=\"avatar\" src=\"{}\" alt=\"\" loading=\"lazy\">",
            encode_minimal(&images.image(src).width(64).height(64).fit(Fit::Crop).url())
        ),
        None => "<span class=\"avatar placeholder\" aria-hidden=\"true\">&#128100;</span>".to_string(),
    };
    let description = post
        .description
        .as_deref()
        .map(|d| format!("<p class=\"description\">{}</p>", encode_minimal(d)))
        .unwrap_or_default();

    format!(
        "<article class=\"post-summary\">{thumbnail}\
         <p class=\"meta\"><time datetime=\"{datetime}\">{date}</time> <span class=\"author\">{avatar}{author}</span></p>\
         <h2><a href=\"/blog/{slug}\">{title}</a></h2>{description}{tags}</article>",
        datetime = encode_minimal(&post.date),
        date = encode_minimal(&display_date(post)),
        author = encode_minimal(&post.author),
        slug = urlencoding::encode(&post.slug),
        title = encode_minimal(&post.title),
        tags = tag_list(&post.tags),
    )
}

pub fn blog_list_fragment(posts: &[Post], state: &ListState, images: &ImageUrlBuilder) -> String {
    let mut out = String::from("<section class=\"blog\"><h1>/ TRANSMISSIONS</h1><nav class=\"tag-filter\">");

    for tag in tag_vocabulary(posts) {
        let filter = TagFilter::parse(Some(&tag));
        let active = if &filter == state.tag() { " active" } else { "" };
        out.push_str(&format!(
            "<a class=\"tag{active}\" href=\"{}\">{}</a>",
            encode_minimal(&state.with_tag(filter).href("/blog")),
            encode_minimal(&tag.to_uppercase())
        ));
    }
    out.push_str("</nav>");

    let view = state.view(posts);
    out.push_str(&format!("<p class=\"count\">{} ENTRIES</p>", view.total_items));
    if view.is_empty() {
        out.push_str(&format!("<p class=\"empty-state\">{BLOG_EMPTY_MARKER}</p>"));
    } else {
        for post in &view.items {
            out.push_str(&post_summary(post, images));
        }
    }

    if view.total_pages > 1 {
        out.push_str("<nav class=\"pagination\">");
        if view.has_prev() {
            out.push_str(&format!(
                "<a class=\"prev\" href=\"{}\">&lt; PREV</a>",
                encode_minimal(&state.with_page(view.page - 1).href("/blog"))
            ));
        } else {
            out.push_str("<span class=\"prev disabled\">&lt; PREV</span>");
        }
        out.push_str(&format!(
            "<span class=\"page\">PAGE {} / {}</span>",
            view.page, view.total_pages
        ));
        if view.has_next() {
            out.push_str(&format!(
                "<a class=\"next\" href=\"{}\">NEXT &gt;</a>",
                encode_minimal(&state.with_page(view.page + 1).href("/blog"))
            ));
        } else {
            out.push_str("<span class=\"next disabled\">NEXT &gt;</span>");
        }
        out.push_str("</nav>");
    }

    out.push_str("</section>");
    out
}

pub fn blog_post_fragment(post: &Post, images: &ImageUrlBuilder) -> String {
    let time = post
        .published
        .map(|d| format!("<span class=\"time\">{} LOCAL</span>", d.format("%H:%M")))
        .unwrap_or_default();
    let avatar = post
        .author_image
        .as_deref()
        .map(|src| {
            format!(
                "<img class=\"avatar\" src=\"{}\" alt=\"\">",
                encode_minimal(&images.image(src).width(64).height(64).fit(Fit::Crop).url())
            )
        })
        .unwrap_or_default();
    let thumbnail = post
        .thumbnail
        .as_deref()
        .map(|src| {
            format!(
                "<figure class=\"thumbnail\"><img src=\"{}\" alt=\"{}\"></figure>",
                encode_minimal(&images.image(src).width(1200).fit(Fit::Max).url()),
                encode_minimal(&post.title)
            )
        })
        .unwrap_or_default();

    format!(
        "<a class=\"back\" href=\"/blog\">BACK_TO_LOGS</a>\
         <article class=\"post\"><header>\
         <p class=\"meta\"><time datetime=\"{datetime}\">{date}</time>{time}\
         <span class=\"author\">{avatar}{author}</span></p>\
         <h1>{title}</h1>{thumbnail}</header>\
         <div class=\"body\">{body}</div>{tags}</article>\
         <p class=\"signature\">// END_OF_TRANSMISSION</p>",
        datetime = encode_minimal(&post.date),
        date = encode_minimal(&display_date(post)),
        author = encode_minimal(&post.author),
        title = encode_minimal(&post.title),
        body = render_post_body(&post.body, images),
        tags = tag_list(&post.tags),
    )
}

pub fn not_found_fragment(template: &str, slug: &str) -> String {
    template.replace("{{slug}}", &encode_minimal(slug))
}
