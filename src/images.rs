//! Image URL building for thumbnails, avatars and inline body images.
//!
//! CMS asset references (`image-<id>-<w>x<h>-<ext>`) resolve to CDN URLs with
//! transform parameters; anything else is treated as an already fetchable
//! URL or site path and passed through untouched.

use crate::config::ImageSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Fill the box exactly, cropping overflow.
    Crop,
    /// Fit inside the box without upscaling.
    Max,
}

impl Fit {
    fn as_str(self) -> &'static str {
        match self {
            Fit::Crop => "crop",
            Fit::Max => "max",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Webp,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Format::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    cdn_base: String,
    project_id: Option<String>,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(settings: &ImageSettings) -> Self {
        Self {
            cdn_base: settings.cdn_base.trim_end_matches('/').to_string(),
            project_id: settings.project_id.clone(),
            dataset: settings.dataset.clone(),
        }
    }

    pub fn image<'a>(&'a self, source: &'a str) -> ImageUrl<'a> {
        ImageUrl {
            builder: self,
            source,
            width: None,
            height: None,
            fit: None,
            format: None,
        }
    }
}

/// One pending image request; finish with [`ImageUrl::url`].
#[derive(Debug, Clone)]
pub struct ImageUrl<'a> {
    builder: &'a ImageUrlBuilder,
    source: &'a str,
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<Fit>,
    format: Option<Format>,
}

impl ImageUrl<'_> {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn fit(mut self, fit: Fit) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn url(&self) -> String {
        let (Some(project_id), Some(asset)) =
            (self.builder.project_id.as_deref(), AssetRef::parse(self.source))
        else {
            return self.source.to_string();
        };

        let mut url = format!(
            "{}/images/{}/{}/{}-{}.{}",
            self.builder.cdn_base,
            project_id,
            self.builder.dataset,
            asset.id,
            asset.dimensions,
            asset.extension
        );

        let mut params = Vec::new();
        if let Some(w) = self.width {
            params.push(format!("w={w}"));
        }
        if let Some(h) = self.height {
            params.push(format!("h={h}"));
        }
        if let Some(fit) = self.fit {
            params.push(format!("fit={}", fit.as_str()));
        }
        if let Some(fm) = self.format {
            params.push(format!("fm={}", fm.as_str()));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }
}

struct AssetRef<'a> {
    id: &'a str,
    dimensions: &'a str,
    extension: &'a str,
}

impl<'a> AssetRef<'a> {
    fn parse(source: &'a str) -> Option<Self> {
        let rest = source.strip_prefix("image-")?;
        let mut parts = rest.rsplitn(3, '-');
        let extension = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;

        let (w, h) = dimensions.split_once('x')?;
        let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if id.is_empty() || extension.is_empty() || !numeric(w) || !numeric(h) {
            return None;
        }
        Some(Self {
            id,
            dimensions,
            extension,
        })
    }
}
