use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("front matter error in `{path}`: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("no front matter in `{0}`")]
    MissingFrontMatter(PathBuf),

    #[error("site config parsing error")]
    Config(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn error_display_names_the_file() {
        let err = ContentError::Io(
            PathBuf::from("content/posts"),
            Error::new(ErrorKind::NotFound, "missing"),
        );
        assert!(format!("{err}").contains("content/posts"));

        let err = ContentError::FrontMatter {
            path: PathBuf::from("a.md"),
            message: "missing field `title`".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("a.md"));
        assert!(display.contains("title"));
    }
}
