use futures::future::BoxFuture;

use crate::error::ContentError;
use crate::models::Post;

/// Where posts come from. Implementations return posts newest first.
pub trait ContentSource: Send + Sync {
    fn list_posts(&self) -> BoxFuture<'_, Result<Vec<Post>, ContentError>>;

    /// `Ok(None)` when no post carries `slug`.
    fn get_post<'a>(&'a self, slug: &'a str) -> BoxFuture<'a, Result<Option<Post>, ContentError>>;
}
