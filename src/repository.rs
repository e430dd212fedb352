use crate::models::Post;

/// Posts fetched for a single request.
#[derive(Debug, Default)]
pub struct PostRepository {
    posts: Vec<Post>,
}

impl PostRepository {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    // First match wins on duplicate slugs.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }
}
