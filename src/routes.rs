use std::{path::Path as FsPath, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, get_service},
    Router,
};
use serde::Deserialize;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, error};

use crate::hot_reload::ws_handler;
use crate::images::ImageUrlBuilder;
use crate::listing::{ListState, ProjectFilter, TagFilter};
use crate::pages::{
    blog_list_fragment, blog_post_fragment, home_fragment, not_found_fragment, render_with_layout,
    work_fragment,
};
use crate::repository::PostRepository;
use crate::session::{IntroSession, SET_INTRO_COOKIE};
use crate::state::{AppState, RefreshBroadcaster, RouterState};

#[derive(Deserialize, Debug, Default)]
pub struct BlogQuery {
    tag: Option<String>,
    page: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct WorkQuery {
    q: Option<String>,
    tag: Option<String>,
}

async fn render_page(state: &AppState, heading: &str, content: &str) -> String {
    let layout = state.layout_html.read().await;
    let banner = state.banner_html.read().await;
    let site = state.site.read().await;

    let title = if heading.is_empty() {
        site.site.title.clone()
    } else {
        format!("{} | {}", heading, site.site.title)
    };
    render_with_layout(&layout, &title, &banner, content, state.is_development)
}

async fn homepage(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let intro = IntroSession::from_headers(&headers);
    let content = {
        let home = state.home_html.read().await;
        let site = state.site.read().await;
        let featured = &site.projects[..site.site.featured_projects.min(site.projects.len())];
        home_fragment(&home, featured, intro)
    };

    let mut response = Html(render_page(&state, "", &content).await).into_response();
    if !intro.intro_shown {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, HeaderValue::from_static(SET_INTRO_COOKIE));
    }
    response
}

async fn work(State(state): State<Arc<AppState>>, Query(query): Query<WorkQuery>) -> Html<String> {
    let filter = ProjectFilter::new(query.q.as_deref(), query.tag.as_deref());
    let content = {
        let site = state.site.read().await;
        work_fragment(&site.projects, &filter)
    };
    Html(render_page(&state, "Work", &content).await)
}

async fn blog_list(State(state): State<Arc<AppState>>, Query(query): Query<BlogQuery>) -> Html<String> {
    let posts = match state.source.list_posts().await {
        Ok(posts) => posts,
        Err(e) => {
            error!("Failed to fetch posts: {}", e);
            Vec::new()
        }
    };
    let repository = PostRepository::new(posts);

    let (per_page, images) = {
        let site = state.site.read().await;
        (site.site.posts_per_page, ImageUrlBuilder::new(&site.images))
    };
    let mut list_state = ListState::new(per_page);
    list_state.select_tag(TagFilter::parse(query.tag.as_deref()));
    if let Some(page) = query.page.as_deref().and_then(|p| p.trim().parse().ok()) {
        list_state.go_to(page);
    }

    let content = blog_list_fragment(repository.all(), &list_state, &images);
    Html(render_page(&state, "Blog", &content).await)
}

async fn blog_post(Path(slug): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let post = match state.source.get_post(&slug).await {
        Ok(post) => post,
        Err(e) => {
            error!("Failed to fetch post {}: {}", slug, e);
            None
        }
    };

    let Some(post) = post else {
        debug!(%slug, "post not found");
        return not_found(&state, &slug).await;
    };

    let images = ImageUrlBuilder::new(&state.site.read().await.images);
    let content = blog_post_fragment(&post, &images);
    Html(render_page(&state, &post.title, &content).await).into_response()
}

async fn not_found(state: &AppState, slug: &str) -> Response {
    let body = not_found_fragment(&state.not_found_html.read().await, slug);
    let page = render_page(state, "Not Found", &body).await;
    (StatusCode::NOT_FOUND, Html(page)).into_response()
}

pub fn build_router(app_state: Arc<AppState>, broadcaster: RefreshBroadcaster, content_dir: &FsPath) -> Router {
    let static_root = content_dir.join("static");
    let static_dir = get_service(ServeDir::new(&static_root));
    let favicon = get_service(ServeFile::new(static_root.join("favicon.svg")));

    let router_state = RouterState {
        app_state,
        broadcaster,
    };

    Router::new()
        .route("/", get(homepage))
        .route("/work", get(work))
        .route("/blog", get(blog_list))
        .route("/blog/{slug}", get(blog_post))
        .nest_service("/static", static_dir)
        .route_service("/favicon.svg", favicon)
        .route("/ws", get(ws_handler))
        .with_state(router_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use futures::future::BoxFuture;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    use crate::config::{SiteConfig, DEFAULT_CONTENT_DIR};
    use crate::content_loader::{load_content, LocalMarkdownSource, SiteContent};
    use crate::error::ContentError;
    use crate::models::{parse_date, Post};
    use crate::pages::{BLOG_EMPTY_MARKER, WORK_EMPTY_MARKER};
    use crate::source::ContentSource;

    struct MemorySource(Vec<Post>);

    impl ContentSource for MemorySource {
        fn list_posts(&self) -> BoxFuture<'_, Result<Vec<Post>, ContentError>> {
            Box::pin(async move { Ok(self.0.clone()) })
        }

        fn get_post<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Option<Post>, ContentError>> {
            Box::pin(async move { Ok(PostRepository::new(self.0.clone()).find_by_slug(slug).cloned()) })
        }
    }

    struct FailingSource;

    impl ContentSource for FailingSource {
        fn list_posts(&self) -> BoxFuture<'_, Result<Vec<Post>, ContentError>> {
            Box::pin(async { Err(ContentError::MissingFrontMatter("broken.md".into())) })
        }

        fn get_post<'a>(&'a self, _slug: &'a str) -> BoxFuture<'a, Result<Option<Post>, ContentError>> {
            Box::pin(async { Err(ContentError::MissingFrontMatter("broken.md".into())) })
        }
    }

    fn post(slug: &str, date: &str, tags: &[&str]) -> Post {
        Post {
            slug: slug.to_string(),
            title: format!("Post {slug}"),
            date: date.to_string(),
            published: parse_date(date),
            author: "Jo".to_string(),
            author_image: None,
            thumbnail: None,
            description: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body: "Body text".to_string(),
        }
    }

    fn app(source: Arc<dyn ContentSource>) -> Router {
        let site = SiteConfig::parse(
            r##"
[[projects]]
title = "Neon City (Game Prototype)"
desc = "A cyberpunk-themed platformer game built with Unity."
tags = ["Unity", "C#"]
status = "PROTOTYPE"
img = "/static/neon.png"
link = "#"

[[projects]]
title = "Portfolio v1"
desc = "The first iteration of my personal portfolio website."
tags = ["React"]
status = "ARCHIVED"
img = "/static/v1.png"
link = "#"
"##,
        )
        .unwrap();
        let content = SiteContent {
            banner_html: "<header>banner</header>".to_string(),
            layout_html: "<html><title>{{ title }}</title><body>{{ banner }}{{ content }}</body></html>".to_string(),
            home_html: "<p>home</p>".to_string(),
            not_found_html: "<p>FILE_NOT_FOUND {{slug}}</p><a href=\"/\">RETURN_TO_ROOT</a>".to_string(),
            site,
        };
        let state = Arc::new(AppState::new(content, |_| source, DEFAULT_CONTENT_DIR.into(), false));
        let (tx, _rx) = broadcast::channel(1);
        build_router(state, tx, FsPath::new(DEFAULT_CONTENT_DIR))
    }

    async fn get_page(app: Router, uri: &str, cookie: Option<&str>) -> (StatusCode, HeaderMap, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn blog_list_filters_by_tag() {
        let source = Arc::new(MemorySource(vec![
            post("newest", "2026-02-16", &["rust"]),
            post("middle", "2025-06-01", &["go"]),
            post("oldest", "2024-01-01", &["rust"]),
        ]));
        let (status, _, body) = get_page(app(source), "/blog?tag=rust", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/blog/newest"));
        assert!(body.contains("/blog/oldest"));
        assert!(!body.contains("/blog/middle"));
        let newest = body.find("/blog/newest").unwrap();
        let oldest = body.find("/blog/oldest").unwrap();
        assert!(newest < oldest);
    }

    #[tokio::test]
    async fn blog_list_second_page() {
        let posts = (0..15).map(|i| post(&format!("p{i:02}"), "2025-01-01", &[])).collect();
        let (_, _, body) = get_page(app(Arc::new(MemorySource(posts))), "/blog?page=2", None).await;
        assert!(body.contains("/blog/p10"));
        assert!(body.contains("/blog/p14"));
        assert!(!body.contains("/blog/p09"));
        assert!(body.contains("next disabled"));
    }

    #[tokio::test]
    async fn failing_source_renders_empty_state() {
        let (status, _, body) = get_page(app(Arc::new(FailingSource)), "/blog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(BLOG_EMPTY_MARKER));
    }

    #[tokio::test]
    async fn missing_slug_is_not_found_page() {
        let (status, _, body) = get_page(app(Arc::new(MemorySource(Vec::new()))), "/blog/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("FILE_NOT_FOUND missing"));
        assert!(body.contains("RETURN_TO_ROOT"));

        let (status, _, _) = get_page(app(Arc::new(FailingSource)), "/blog/any", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn post_detail_renders_body() {
        let source = Arc::new(MemorySource(vec![post("hello", "2026-02-16", &["rust"])]));
        let (status, _, body) = get_page(app(source), "/blog/hello", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Post hello | Portfolio</title>"));
        assert!(body.contains("<p>Body text</p>"));
        assert!(body.contains("February 16, 2026"));
    }

    #[tokio::test]
    async fn work_search_and_tag() {
        let source = Arc::new(MemorySource(Vec::new()));
        let (_, _, body) = get_page(app(source.clone()), "/work?q=neon&tag=Unity", None).await;
        assert!(body.contains("Neon City"));
        assert!(!body.contains("<h3><a href=\"#\">Portfolio v1"));

        let (_, _, body) = get_page(app(source), "/work?q=zzz", None).await;
        assert!(body.contains(WORK_EMPTY_MARKER));
    }

    #[tokio::test]
    async fn intro_plays_once_per_session() {
        let source = Arc::new(MemorySource(Vec::new()));
        let (_, headers, body) = get_page(app(source.clone()), "/", None).await;
        assert!(body.contains("boot-sequence"));
        assert_eq!(
            headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok()),
            Some(SET_INTRO_COOKIE)
        );
        assert!(body.contains("Neon City"));

        let (_, headers, body) = get_page(app(source), "/", Some("intro_shown=1")).await;
        assert!(!body.contains("boot-sequence"));
        assert!(headers.get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn serves_bundled_content_end_to_end() {
        let dir = FsPath::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONTENT_DIR);
        let content = load_content(&dir).await.unwrap();
        let state = Arc::new(AppState::new(
            content,
            |site| -> Arc<dyn ContentSource> { Arc::new(LocalMarkdownSource::new(&dir, site)) },
            dir.clone(),
            false,
        ));
        let (tx, _rx) = broadcast::channel(1);
        let router = build_router(state, tx, &dir);

        let (status, _, body) = get_page(router.clone(), "/blog", None).await;
        assert_eq!(status, StatusCode::OK);
        let newest = body.find("/blog/signal-to-noise").unwrap();
        let oldest = body.find("/blog/hello-world").unwrap();
        assert!(newest < oldest);

        let (status, _, _) = get_page(router.clone(), "/blog/hello-world", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, body) = get_page(router.clone(), "/favicon.svg", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<svg"));

        // every site-relative image the pages link to is served
        let (_, _, work) = get_page(router.clone(), "/work", None).await;
        let local: Vec<&str> = work
            .split("src=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .filter(|src| src.starts_with("/static/"))
            .collect();
        assert!(local.contains(&"/static/simba.svg"));
        for src in local {
            let (status, _, _) = get_page(router.clone(), src, None).await;
            assert_eq!(status, StatusCode::OK, "{src}");
        }
    }
}
