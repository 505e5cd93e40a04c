/// A pull request comment, reduced to what bot detection needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub body: String,
    /// Slug of the GitHub App the comment was performed via, if any.
    pub app: Option<String>,
}

impl Comment {
    pub fn new(author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            body: body.into(),
            app: None,
        }
    }

    pub fn via_app(mut self, slug: impl Into<String>) -> Self {
        self.app = Some(slug.into());
        self
    }
}
