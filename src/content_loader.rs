use std::path::{Path, PathBuf};

use futures::future::{join_all, BoxFuture};
use gray_matter::{engine::YAML, Matter};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::{SharedSite, SiteConfig};
use crate::error::ContentError;
use crate::markdown::{first_paragraph_excerpt, render_markdown_to_html};
use crate::models::{parse_date, sort_newest_first, FrontMatter, PageMatter, Post};
use crate::repository::PostRepository;
use crate::source::ContentSource;
use crate::state::AppState;

pub const POSTS_DIR: &str = "posts";

/// Templates and site settings that stay in memory between requests.
pub struct SiteContent {
    pub banner_html: String,
    pub layout_html: String,
    pub home_html: String,
    pub not_found_html: String,
    pub site: SiteConfig,
}

async fn read(path: PathBuf) -> Result<String, ContentError> {
    fs::read_to_string(&path)
        .await
        .map_err(|e| ContentError::Io(path, e))
}

pub async fn load_content(content_dir: &Path) -> Result<SiteContent, ContentError> {
    let banner_html = read(content_dir.join("banner.html")).await?;
    let layout_html = read(content_dir.join("layout.html")).await?;
    let not_found_html = read(content_dir.join("not_found.html")).await?;

    let home_path = content_dir.join("home.md");
    let home_md_content = read(home_path.clone()).await?;
    let home_html = render_markdown_to_html(&strip_front_matter(&home_path, &home_md_content)?);

    let site = SiteConfig::load(content_dir).await?;

    Ok(SiteContent {
        banner_html,
        layout_html,
        home_html,
        not_found_html,
        site,
    })
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_content(&app_state.content_dir).await {
        Ok(content) => {
            *app_state.banner_html.write().await = content.banner_html;
            *app_state.layout_html.write().await = content.layout_html;
            *app_state.home_html.write().await = content.home_html;
            *app_state.not_found_html.write().await = content.not_found_html;
            *app_state.site.write().await = content.site;
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload content: {}", e);
        }
    }
}

fn strip_front_matter(path: &Path, source: &str) -> Result<String, ContentError> {
    let matter = Matter::<YAML>::new();
    matter
        .parse::<PageMatter>(source)
        .map(|parsed| parsed.content)
        .map_err(|e| ContentError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Builds a [`Post`] from one markdown file. The slug comes from the file
/// stem unless the front matter sets one.
pub fn parse_post(path: &Path, source: &str, default_author: &str) -> Result<Post, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(source)
        .map_err(|e| ContentError::FrontMatter {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let front_matter = parsed
        .data
        .ok_or_else(|| ContentError::MissingFrontMatter(path.to_path_buf()))?;

    let slug = front_matter
        .slug
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let published = parse_date(&front_matter.date);
    if published.is_none() {
        warn!(path = %path.display(), date = %front_matter.date, "unparseable post date");
    }

    let description = front_matter
        .description
        .or_else(|| first_paragraph_excerpt(&parsed.content));

    Ok(Post {
        slug,
        title: front_matter.title,
        date: front_matter.date,
        published,
        author: front_matter
            .author
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| default_author.to_string()),
        author_image: front_matter.author_image,
        thumbnail: front_matter.thumbnail,
        description,
        tags: front_matter.tags.unwrap_or_default(),
        body: parsed.content,
    })
}

/// Reads `posts/*.md` from the content directory on every call. The default
/// author is read from the live site config, so reloads apply immediately.
pub struct LocalMarkdownSource {
    posts_dir: PathBuf,
    site: SharedSite,
}

impl LocalMarkdownSource {
    pub fn new(content_dir: &Path, site: SharedSite) -> Self {
        Self {
            posts_dir: content_dir.join(POSTS_DIR),
            site,
        }
    }

    async fn load_posts(&self) -> Result<Vec<Post>, ContentError> {
        let default_author = self.site.read().await.site.default_author.clone();
        let default_author = default_author.as_str();
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.posts_dir)
            .await
            .map_err(|e| ContentError::Io(self.posts_dir.clone(), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ContentError::Io(self.posts_dir.clone(), e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }

        let parsed = join_all(paths.into_iter().map(|path| async move {
            let source = read(path.clone()).await?;
            parse_post(&path, &source, default_author)
        }))
        .await;

        // broken files are logged and skipped
        let mut posts: Vec<Post> = parsed
            .into_iter()
            .filter_map(|result| match result {
                Ok(post) => Some(post),
                Err(e) => {
                    error!("Skipping post: {}", e);
                    None
                }
            })
            .collect();

        sort_newest_first(&mut posts);
        debug!(count = posts.len(), "loaded posts");
        Ok(posts)
    }
}

impl ContentSource for LocalMarkdownSource {
    fn list_posts(&self) -> BoxFuture<'_, Result<Vec<Post>, ContentError>> {
        Box::pin(self.load_posts())
    }

    fn get_post<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Option<Post>, ContentError>> {
        Box::pin(async move {
            let posts = self.load_posts().await?;
            Ok(PostRepository::new(posts).find_by_slug(slug).cloned())
        })
    }
}
