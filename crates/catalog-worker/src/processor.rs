//! Thumbnail processor
//!
//! Consumes thumbnail jobs: loads the product, decodes its source image,
//! resizes so the longest edge fits the configured maximum (aspect ratio
//! preserved), re-encodes as JPEG, and writes the derived reference back onto
//! the product.
//!
//! The job may be delivered more than once. Steps are guarded to make
//! repetition safe: an existing thumbnail short-circuits, duplicate
//! deliveries for the same product serialize on a per-product lock, and the
//! final write is a compare-and-set against current persisted state.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use catalog_core::error::DomainError;
use catalog_core::repositories::{BlobStore, ProductRepository, ThumbnailJob};

use crate::error::WorkerError;

#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// Maximum dimension (width or height) in pixels.
    pub max_dimension: u32,
    /// JPEG quality (1-100).
    pub quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_dimension: 300,
            quality: 85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// Idempotency guard hit: a thumbnail is already present. No work.
    AlreadyExists,
    /// The product carries no source image. Not a failure.
    NoSourceImage,
    Generated,
}

/// Processing seam between the worker pool and the thumbnail logic.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, job: ThumbnailJob) -> Result<ThumbnailOutcome, WorkerError>;
}

pub struct ThumbnailProcessor<R: ProductRepository, B: BlobStore> {
    repo: Arc<R>,
    blobs: Arc<B>,
    config: ThumbnailConfig,
    // Per-product locks covering the check-then-write sequence.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<R: ProductRepository, B: BlobStore> ThumbnailProcessor<R, B> {
    pub fn new(repo: Arc<R>, blobs: Arc<B>, config: ThumbnailConfig) -> Self {
        Self {
            repo,
            blobs,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn entity_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn process_inner(&self, product_id: Uuid) -> Result<ThumbnailOutcome, WorkerError> {
        // 1. Load current persisted state
        let product = self
            .repo
            .find_by_id(&product_id)
            .await
            .map_err(to_worker_error(product_id))?
            .ok_or(WorkerError::ProductNotFound(product_id))?;

        // 2. Idempotency guard
        if product.thumbnail.is_some() {
            debug!("Thumbnail already exists for {}", product_id);
            return Ok(ThumbnailOutcome::AlreadyExists);
        }

        // 3. Nothing to derive from
        let image_ref = match product.image {
            Some(ref r) => r.clone(),
            None => {
                debug!("No source image for {}", product_id);
                return Ok(ThumbnailOutcome::NoSourceImage);
            }
        };

        // 4. Read, resize, re-encode off the async runtime
        let data = self
            .blobs
            .read(&image_ref)
            .await
            .map_err(|e| WorkerError::TransientMedia(e.to_string()))?;

        let config = self.config.clone();
        let thumb = tokio::task::spawn_blocking(move || render_thumbnail(&data, &config))
            .await
            .map_err(|e| WorkerError::TransientMedia(format!("thumbnail task: {}", e)))??;

        let thumb_ref = self
            .blobs
            .write(&thumbnail_name(&image_ref), &thumb)
            .await
            .map_err(|e| WorkerError::TransientMedia(e.to_string()))?;

        // 5. Compare-and-set the reference onto the product
        let written = self
            .repo
            .set_thumbnail_if_absent(&product_id, &thumb_ref)
            .await
            .map_err(to_worker_error(product_id))?;

        if !written {
            // Lost the race against another writer; their artifact stands.
            return Ok(ThumbnailOutcome::AlreadyExists);
        }

        info!("Generated thumbnail {} for {}", thumb_ref, product_id);
        Ok(ThumbnailOutcome::Generated)
    }
}

#[async_trait]
impl<R: ProductRepository, B: BlobStore> JobProcessor for ThumbnailProcessor<R, B> {
    async fn process(&self, job: ThumbnailJob) -> Result<ThumbnailOutcome, WorkerError> {
        let lock = self.entity_lock(job.product_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.process_inner(job.product_id).await
        };
        drop(lock);

        // Retire the registry entry once no other delivery holds it, so the
        // map stays bounded by in-flight products rather than catalog size.
        let mut locks = self.locks.lock().await;
        if locks.get(&job.product_id).map(Arc::strong_count) == Some(1) {
            locks.remove(&job.product_id);
        }
        drop(locks);

        result
    }
}

fn to_worker_error(id: Uuid) -> impl Fn(DomainError) -> WorkerError {
    move |e| match e {
        // Deleted between enqueue and processing
        DomainError::ProductNotFound | DomainError::ProductNotFoundById(_) => {
            WorkerError::ProductNotFound(id)
        }
        DomainError::StorageError(m) => WorkerError::TransientMedia(m),
        other => WorkerError::Database(other.to_string()),
    }
}

/// Derived artifact name: fixed prefix + source basename, under its own
/// directory.
fn thumbnail_name(image_ref: &str) -> String {
    let basename = image_ref.rsplit('/').next().unwrap_or(image_ref);
    format!("thumbnails/thumb_{}", basename)
}

/// CPU-bound: decode, fit the longest edge within `max_dimension` (aspect
/// preserved; smaller images are re-encoded as-is), encode JPEG.
fn render_thumbnail(data: &[u8], config: &ThumbnailConfig) -> Result<Vec<u8>, WorkerError> {
    let img = image::load_from_memory(data)
        .map_err(|e| WorkerError::TransientMedia(format!("decoding image: {}", e)))?;

    let resized = if img.width() > config.max_dimension || img.height() > config.max_dimension {
        img.thumbnail(config.max_dimension, config.max_dimension)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, config.quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| WorkerError::TransientMedia(format!("encoding thumbnail: {}", e)))?;

    Ok(buf.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use catalog_core::domain::Product;
    use catalog_core::repositories::{ProductFilter, SlugIndex};
    use rust_decimal::Decimal;

    pub(crate) struct InMemoryRepo {
        pub products: Mutex<HashMap<Uuid, Product>>,
    }

    impl InMemoryRepo {
        pub fn new() -> Self {
            Self {
                products: Mutex::new(HashMap::new()),
            }
        }

        pub async fn insert(&self, product: Product) {
            self.products.lock().await.insert(product.id, product);
        }
    }

    #[async_trait]
    impl SlugIndex for InMemoryRepo {
        async fn slug_exists(
            &self,
            slug: &str,
            exclude: Option<&Uuid>,
        ) -> Result<bool, DomainError> {
            let products = self.products.lock().await;
            Ok(products
                .values()
                .any(|p| p.slug == slug && Some(&p.id) != exclude))
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryRepo {
        async fn find_by_id(&self, id: &Uuid) -> Result<Option<Product>, DomainError> {
            Ok(self.products.lock().await.get(id).cloned())
        }

        async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
            let products = self.products.lock().await;
            Ok(products
                .values()
                .find(|p| p.slug == slug && p.is_active)
                .cloned())
        }

        async fn find_by_slug_any(&self, slug: &str) -> Result<Option<Product>, DomainError> {
            let products = self.products.lock().await;
            Ok(products.values().find(|p| p.slug == slug).cloned())
        }

        async fn list(&self, _filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
            Ok(self.products.lock().await.values().cloned().collect())
        }

        async fn create(&self, product: &Product) -> Result<Product, DomainError> {
            self.insert(product.clone()).await;
            Ok(product.clone())
        }

        async fn update(&self, product: &Product) -> Result<Product, DomainError> {
            self.insert(product.clone()).await;
            Ok(product.clone())
        }

        async fn set_thumbnail_if_absent(
            &self,
            id: &Uuid,
            thumbnail: &str,
        ) -> Result<bool, DomainError> {
            let mut products = self.products.lock().await;
            match products.get_mut(id) {
                Some(p) if p.thumbnail.is_none() => {
                    p.thumbnail = Some(thumbnail.to_string());
                    Ok(true)
                }
                Some(_) => Ok(false),
                None => Err(DomainError::ProductNotFoundById(id.to_string())),
            }
        }

        async fn detach_category(&self, _category_id: &Uuid) -> Result<u64, DomainError> {
            Ok(0)
        }
    }

    pub(crate) struct InMemoryBlobStore {
        pub blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl InMemoryBlobStore {
        pub fn new() -> Self {
            Self {
                blobs: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl BlobStore for InMemoryBlobStore {
        async fn read(&self, blob_ref: &str) -> Result<Vec<u8>, DomainError> {
            self.blobs
                .lock()
                .await
                .get(blob_ref)
                .cloned()
                .ok_or_else(|| DomainError::StorageError(format!("missing blob: {}", blob_ref)))
        }

        async fn write(&self, name: &str, data: &[u8]) -> Result<String, DomainError> {
            self.blobs
                .lock()
                .await
                .insert(name.to_string(), data.to_vec());
            Ok(name.to_string())
        }
    }

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn product_with_image(image: Option<&str>) -> Product {
        Product::new(
            "Camera".to_string(),
            "camera".to_string(),
            None,
            Decimal::new(300, 0),
            1,
            None,
            image.map(|s| s.to_string()),
        )
        .unwrap()
    }

    async fn setup(
        image: Option<&str>,
    ) -> (
        ThumbnailProcessor<InMemoryRepo, InMemoryBlobStore>,
        Arc<InMemoryRepo>,
        Arc<InMemoryBlobStore>,
        Uuid,
    ) {
        let repo = Arc::new(InMemoryRepo::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let product = product_with_image(image);
        let id = product.id;
        repo.insert(product).await;

        let processor =
            ThumbnailProcessor::new(repo.clone(), blobs.clone(), ThumbnailConfig::default());
        (processor, repo, blobs, id)
    }

    #[tokio::test]
    async fn test_generates_thumbnail_within_bounds() {
        let (processor, repo, blobs, id) = setup(Some("products/camera.png")).await;
        blobs
            .write("products/camera.png", &png_bytes(800, 600))
            .await
            .unwrap();

        let outcome = processor.process(ThumbnailJob { product_id: id }).await.unwrap();
        assert_eq!(outcome, ThumbnailOutcome::Generated);

        let product = repo.find_by_id(&id).await.unwrap().unwrap();
        let thumb_ref = product.thumbnail.unwrap();
        assert_eq!(thumb_ref, "thumbnails/thumb_camera.png");

        let thumb = blobs.read(&thumb_ref).await.unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert!(decoded.width() <= 300 && decoded.height() <= 300);
        // Aspect ratio preserved: 800x600 fits to 300x225.
        assert_eq!((decoded.width(), decoded.height()), (300, 225));
    }

    #[tokio::test]
    async fn test_duplicate_delivery_does_work_once() {
        let (processor, _, blobs, id) = setup(Some("products/camera.png")).await;
        blobs
            .write("products/camera.png", &png_bytes(800, 600))
            .await
            .unwrap();

        let job = ThumbnailJob { product_id: id };
        assert_eq!(
            processor.process(job).await.unwrap(),
            ThumbnailOutcome::Generated
        );
        let first = blobs.read("thumbnails/thumb_camera.png").await.unwrap();

        assert_eq!(
            processor.process(job).await.unwrap(),
            ThumbnailOutcome::AlreadyExists
        );
        let second = blobs.read("thumbnails/thumb_camera.png").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_lock_registry_drains_after_processing() {
        let (processor, _, blobs, id) = setup(Some("products/camera.png")).await;
        blobs
            .write("products/camera.png", &png_bytes(32, 32))
            .await
            .unwrap();

        let job = ThumbnailJob { product_id: id };
        processor.process(job).await.unwrap();
        assert!(processor.locks.lock().await.is_empty());

        // A duplicate delivery re-registers and drains again.
        processor.process(job).await.unwrap();
        assert!(processor.locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_source_image() {
        let (processor, _, _, id) = setup(None).await;

        let outcome = processor.process(ThumbnailJob { product_id: id }).await.unwrap();
        assert_eq!(outcome, ThumbnailOutcome::NoSourceImage);
    }

    #[tokio::test]
    async fn test_missing_product_is_permanent_failure() {
        let repo = Arc::new(InMemoryRepo::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let processor =
            ThumbnailProcessor::new(repo, blobs, ThumbnailConfig::default());

        let err = processor
            .process(ThumbnailJob {
                product_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::ProductNotFound(_)));
        assert!(!err.is_retriable());
    }

    #[tokio::test]
    async fn test_corrupt_image_is_transient() {
        let (processor, _, blobs, id) = setup(Some("products/camera.png")).await;
        blobs
            .write("products/camera.png", b"definitely not an image")
            .await
            .unwrap();

        let err = processor
            .process(ThumbnailJob { product_id: id })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::TransientMedia(_)));
        assert!(err.is_retriable());
    }

    #[tokio::test]
    async fn test_small_image_not_upscaled() {
        let (processor, repo, blobs, id) = setup(Some("products/icon.png")).await;
        blobs
            .write("products/icon.png", &png_bytes(100, 80))
            .await
            .unwrap();

        processor.process(ThumbnailJob { product_id: id }).await.unwrap();

        let product = repo.find_by_id(&id).await.unwrap().unwrap();
        let thumb = blobs.read(&product.thumbnail.unwrap()).await.unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 80));
    }
}
