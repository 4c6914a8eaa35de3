//! Application state shared by every command.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use asvzwatch_core::auth::Session;
use asvzwatch_core::context::MarketplaceContext;
use asvzwatch_core::{ApiClient, Config, FileStore, ImageCache};

/// Sub-directory of the cache dir holding the persisted image cache
const IMAGE_CACHE_DIR: &str = "images";

pub struct App {
    pub config: Config,
    pub session: Session,
    pub client: ApiClient,
    pub images: ImageCache<FileStore>,
    pub marketplace: MarketplaceContext,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });
        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));

        let mut session = Session::new(cache_dir.clone());
        if let Err(e) = session.load() {
            warn!(error = %e, "Failed to load saved session");
        }

        let mut client = ApiClient::new(config.base_url())?;
        if let Some(token) = session.token() {
            client.set_token(token.to_string());
        }

        let images = ImageCache::open(FileStore::new(cache_dir.join(IMAGE_CACHE_DIR))?);
        debug!(
            base_url = client.base_url(),
            cached_images = images.len(),
            logged_in = session.is_valid(),
            "App initialized"
        );

        Ok(Self {
            config,
            session,
            client,
            images,
            marketplace: MarketplaceContext::new(),
        })
    }

    /// Fail with a hint unless a valid session is loaded
    pub fn ensure_authenticated(&self) -> Result<()> {
        if self.session.is_valid() {
            Ok(())
        } else {
            anyhow::bail!("Not logged in. Run `asvzwatch login <email>` first.")
        }
    }
}
