//! Responsive image variants.
//!
//! Every `jpg`/`jpeg`/`png` under the content root (outside the static dir)
//! is copied to the output tree together with three variants:
//!
//! | Variant  | File          | Size                                          |
//! |----------|---------------|-----------------------------------------------|
//! | original | `a.jpg`       | untouched                                     |
//! | 1x       | `a.1x.jpg`    | short edge scaled down to `images.size`       |
//! | 2x       | `a.2x.jpg`    | double the 1x if the original allows, else it |
//! | thumb    | `a.t.jpg`     | short edge scaled down to `images.thumb_size` |
//!
//! A variant with the original's dimensions is a plain copy.

use crate::{
    config::SiteConfig,
    content::{ContentError, FileEvent},
    log,
    logger::ProgressBar,
};
use image::imageops::FilterType;
use rayon::prelude::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;
use walkdir::WalkDir;

const EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image io error on `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("cannot decode `{0}`, corrupted file?")]
    Decode(PathBuf, #[source] image::ImageError),

    #[error("`{0}` is outside the content directory")]
    Outside(PathBuf),
}

// ============================================================================
// Sources
// ============================================================================

/// Web paths of an image and its variants, with the 1x dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSources {
    pub orig: String,
    pub x1: String,
    pub x2: String,
    pub thumb: String,
    pub width: u32,
    pub height: u32,
}

impl ImageSources {
    pub fn new(orig: String, width: u32, height: u32) -> Self {
        Self {
            x1: with_variant(&orig, "1x"),
            x2: with_variant(&orig, "2x"),
            thumb: with_variant(&orig, "t"),
            orig,
            width,
            height,
        }
    }

    /// `srcset` attribute value.
    pub fn src_set(&self) -> String {
        format!("{}, {} 2x", self.x1, self.x2)
    }
}

/// Insert a variant marker before the extension: `a/b.jpg` → `a/b.1x.jpg`.
pub fn with_variant(path: &str, variant: &str) -> String {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) => {
            let dot = file_start + dot;
            format!("{}.{variant}{}", &path[..dot], &path[dot..])
        }
        None => format!("{path}.{variant}"),
    }
}

fn variant_path(path: &Path, variant: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(with_variant(&name, variant))
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Resolves image references from Markdown and front matter.
pub trait ImageResolver: Sync {
    fn resolve(&self, src: &str, base_dir: &Path) -> Result<ImageSources, ContentError>;
}

// ============================================================================
// Sizing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPlan {
    pub x1: Dimensions,
    pub x2: Dimensions,
    pub thumb: Dimensions,
}

/// Short edge brought down to `target`, never up.
#[derive(Debug, Clone, Copy)]
struct Scale {
    target: u64,
    short: u64,
}

impl Scale {
    fn new(orig: Dimensions, target: u32) -> Self {
        let short = if orig.width > orig.height {
            orig.height
        } else {
            orig.width
        };
        let (target, short) = if short < target {
            (1, 1)
        } else {
            (u64::from(target), u64::from(short))
        };
        Self { target, short }
    }

    fn below_half(self) -> bool {
        self.target * 2 < self.short
    }

    fn apply(self, orig: Dimensions) -> Dimensions {
        let floor = |side: u32| (u64::from(side) * self.target / self.short) as u32;
        Dimensions {
            width: floor(orig.width),
            height: floor(orig.height),
        }
    }
}

pub fn plan_variants(orig: Dimensions, size: u32, thumb_size: u32) -> VariantPlan {
    let scale = Scale::new(orig, size);
    let x1 = scale.apply(orig);
    let x2 = if scale.below_half() {
        Dimensions {
            width: x1.width * 2,
            height: x1.height * 2,
        }
    } else {
        orig
    };
    VariantPlan {
        x1,
        x2,
        thumb: Scale::new(orig, thumb_size).apply(orig),
    }
}

// ============================================================================
// Filesystem
// ============================================================================

/// Paths and sizes for image processing.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub content_root: PathBuf,
    pub output_root: PathBuf,
    pub static_dir: PathBuf,
    pub size: u32,
    pub thumb_size: u32,
}

impl ImageSettings {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            content_root: config.build.content.clone(),
            output_root: config.build.output.clone(),
            static_dir: config.static_source(),
            size: config.build.images.size,
            thumb_size: config.build.images.thumb_size,
        }
    }

    fn target(&self, source: &Path) -> Result<PathBuf, ImageError> {
        source
            .strip_prefix(&self.content_root)
            .map(|rel| self.output_root.join(rel))
            .map_err(|_| ImageError::Outside(source.to_path_buf()))
    }
}

/// Resolves against the content tree and computes variant sizes.
pub struct FsImageResolver {
    settings: ImageSettings,
    root: PathBuf,
}

impl FsImageResolver {
    pub fn new(settings: ImageSettings) -> Self {
        let root = settings
            .content_root
            .canonicalize()
            .unwrap_or_else(|_| settings.content_root.clone());
        Self { settings, root }
    }
}

impl ImageResolver for FsImageResolver {
    fn resolve(&self, src: &str, base_dir: &Path) -> Result<ImageSources, ContentError> {
        let candidate = match src.strip_prefix('/') {
            Some(rooted) => self.root.join(rooted),
            None => base_dir.join(src),
        };
        let missing = || ContentError::MissingImage {
            src: src.to_string(),
            path: candidate.clone(),
        };

        let source = candidate.canonicalize().map_err(|_| missing())?;
        if !source.is_file() {
            return Err(missing());
        }
        let rel = source.strip_prefix(&self.root).map_err(|_| missing())?;
        let web = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .fold(String::new(), |acc, part| acc + "/" + &part);

        let (width, height) =
            image::image_dimensions(&source).map_err(|err| ContentError::ImageSize(source.clone(), err))?;
        let plan = plan_variants(
            Dimensions { width, height },
            self.settings.size,
            self.settings.thumb_size,
        );

        Ok(ImageSources::new(web, plan.x1.width, plan.x1.height))
    }
}

/// Copy one image to the output tree and write its variants.
///
/// Returns `false` when every output already exists and `force` is off.
pub fn process_image(source: &Path, settings: &ImageSettings, force: bool) -> Result<bool, ImageError> {
    let target = settings.target(source)?;
    let outputs = [
        ("1x", variant_path(&target, "1x")),
        ("2x", variant_path(&target, "2x")),
        ("t", variant_path(&target, "t")),
    ];
    if !force && target.exists() && outputs.iter().all(|(_, p)| p.exists()) {
        return Ok(false);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|err| ImageError::Io(parent.to_path_buf(), err))?;
    }
    fs::copy(source, &target).map_err(|err| ImageError::Io(target.clone(), err))?;

    let (width, height) =
        image::image_dimensions(source).map_err(|err| ImageError::Decode(source.to_path_buf(), err))?;
    let orig = Dimensions { width, height };
    let plan = plan_variants(orig, settings.size, settings.thumb_size);

    let mut decoded = None;
    for ((_, path), dims) in outputs.iter().zip([plan.x1, plan.x2, plan.thumb]) {
        if dims == orig {
            fs::copy(source, path).map_err(|err| ImageError::Io(path.clone(), err))?;
            continue;
        }
        if decoded.is_none() {
            decoded = Some(image::open(source).map_err(|err| ImageError::Decode(source.to_path_buf(), err))?);
        }
        if let Some(img) = &decoded {
            img.resize_exact(dims.width, dims.height, FilterType::Lanczos3)
                .save(path)
                .map_err(|err| ImageError::Decode(path.clone(), err))?;
        }
    }

    Ok(true)
}

/// All images under the content root, outside the static dir.
pub fn collect_images(settings: &ImageSettings) -> Vec<PathBuf> {
    WalkDir::new(&settings.content_root)
        .into_iter()
        .filter_entry(|e| !e.path().starts_with(&settings.static_dir))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_image(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// Process every image in parallel. Returns how many were (re)generated.
pub fn process_all(settings: &ImageSettings, force: bool) -> anyhow::Result<usize> {
    let images = collect_images(settings);
    let processed = AtomicUsize::new(0);
    let bar = ProgressBar::new_if_needed("images", images.len());

    let result = images.par_iter().try_for_each(|path| {
        let done = process_image(path, settings, force);
        if let Some(bar) = &bar {
            bar.inc();
        }
        if done? {
            processed.fetch_add(1, Ordering::Relaxed);
        }
        Ok::<_, ImageError>(())
    });

    if let Some(bar) = &bar {
        bar.finish();
    }
    result?;

    let processed = processed.into_inner();
    if processed > 0 {
        log!("images"; "{processed} image(s) processed");
    }
    Ok(processed)
}

/// React to a watched image event. Returns `false` for non-image paths.
pub fn handle_image_event(event: &FileEvent, settings: &ImageSettings) -> Result<bool, ImageError> {
    let path = event.path();
    if !is_image(path) || path.starts_with(&settings.static_dir) {
        return Ok(false);
    }

    match event {
        FileEvent::Removed(_) => {
            log!(
                "warn";
                "image {} removed, pages using it are broken until rebuilt",
                path.display()
            );
        }
        FileEvent::Changed(_) => {
            log!(
                "warn";
                "image {} changed, pages rendered earlier may carry old dimensions",
                path.display()
            );
            process_image(path, settings, true)?;
        }
        FileEvent::Added(_) => {
            process_image(path, settings, true)?;
            log!("images"; "new image {}", path.display());
        }
    }
    Ok(true)
}
