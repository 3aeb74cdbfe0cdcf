//! The service context: one explicitly passed owner of the key lifecycle

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::publication::KeySetPublisher;
use crate::signing::TokenIssuer;
use crate::status::{ManualRotationResponse, RotationStatus};
use keyrotor_jwt::{Es256Jose, Jose};
use keyrotor_key::{
    DirectoryLock, FileKeyPairStore, KeyLifecycleManager, KeyPairStore, RotationScheduler,
    RotationTask,
};
use std::sync::Arc;
use tracing::{info, warn};

/// How this service may touch the key directory.
#[derive(Debug, Clone)]
enum Access {
    /// Sole writer; the lock is released when the last clone is dropped
    Writer { _lock: Option<Arc<DirectoryLock>> },
    /// Signs and verifies only
    ReadOnly,
}

/// Everything a running service needs, built once at startup and handed to
/// consumers.
#[derive(Debug, Clone)]
pub struct KeyService {
    config: ServiceConfig,
    scheduler: Arc<RotationScheduler>,
    issuer: TokenIssuer,
    publisher: KeySetPublisher,
    files: Option<Arc<FileKeyPairStore>>,
    access: Access,
}

impl KeyService {
    /// Open the configured key directory as its only writer and load or
    /// create the key pair.
    ///
    /// Fails with [`keyrotor_key::KeyError::Locked`] while another process
    /// holds the directory, and if persisted keys are unreadable or
    /// malformed; the service must not start in either case.
    pub fn bootstrap(config: ServiceConfig) -> Result<Self> {
        let store = Arc::new(FileKeyPairStore::open(&config.storage.directory)?);
        let lock = store.lock()?;
        info!(path = %store.directory().display(), "Using key directory");

        let jose: Arc<dyn Jose> = Arc::new(Es256Jose::new());
        let manager = KeyLifecycleManager::initialize(
            Arc::clone(&store) as Arc<dyn KeyPairStore>,
            Arc::clone(&jose),
        )?;
        Ok(Self::assemble(
            config,
            manager,
            jose,
            Some(store),
            Access::Writer {
                _lock: Some(Arc::new(lock)),
            },
        ))
    }

    /// Load the persisted pair for signing and verification only.
    ///
    /// Takes no lock and writes nothing: a missing or half-written key
    /// directory is an error here, and [`Self::rotate_now`] is refused.
    pub fn open_read_only(config: ServiceConfig) -> Result<Self> {
        let store = Arc::new(FileKeyPairStore::open_existing(
            &config.storage.directory,
        )?);
        let jose: Arc<dyn Jose> = Arc::new(Es256Jose::new());
        let manager = KeyLifecycleManager::load(
            Arc::clone(&store) as Arc<dyn KeyPairStore>,
            Arc::clone(&jose),
        )?;
        Ok(Self::assemble(
            config,
            manager,
            jose,
            Some(store),
            Access::ReadOnly,
        ))
    }

    /// Build over an explicit store and JOSE capability.
    ///
    /// The caller is responsible for being the store's only writer.
    pub fn with_parts(
        config: ServiceConfig,
        store: Arc<dyn KeyPairStore>,
        jose: Arc<dyn Jose>,
    ) -> Result<Self> {
        let manager = KeyLifecycleManager::initialize(store, Arc::clone(&jose))?;
        Ok(Self::assemble(
            config,
            manager,
            jose,
            None,
            Access::Writer { _lock: None },
        ))
    }

    fn assemble(
        config: ServiceConfig,
        manager: KeyLifecycleManager,
        jose: Arc<dyn Jose>,
        files: Option<Arc<FileKeyPairStore>>,
        access: Access,
    ) -> Self {
        let manager = Arc::new(manager);
        let scheduler = Arc::new(RotationScheduler::new(
            Arc::clone(&manager),
            config.rotation_settings(),
        ));
        let issuer = TokenIssuer::new(
            Arc::clone(&manager),
            jose,
            config.token_lifetime(),
            config.token.issuer.clone(),
        );
        let publisher = KeySetPublisher::new(manager);

        Self {
            config,
            scheduler,
            issuer,
            publisher,
            files,
            access,
        }
    }

    /// Effective configuration
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The key lifecycle manager
    #[must_use]
    pub fn manager(&self) -> &Arc<KeyLifecycleManager> {
        self.scheduler.manager()
    }

    /// The rotation scheduler
    #[must_use]
    pub fn scheduler(&self) -> &Arc<RotationScheduler> {
        &self.scheduler
    }

    /// Signing facade
    #[must_use]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Publication facade
    #[must_use]
    pub fn publisher(&self) -> &KeySetPublisher {
        &self.publisher
    }

    /// Whether this service may rotate keys
    #[must_use]
    pub fn is_writer(&self) -> bool {
        matches!(self.access, Access::Writer { .. })
    }

    /// Start scheduled rotation on the current tokio runtime.
    pub fn start_rotation(&self) -> Result<RotationTask> {
        self.ensure_writer()?;
        Ok(self.scheduler.spawn())
    }

    /// Rotate now and describe the outcome.
    ///
    /// A failed rotation is reported in the response; only a read-only
    /// service is an error.
    pub fn rotate_now(&self) -> Result<ManualRotationResponse> {
        self.ensure_writer()?;
        Ok(ManualRotationResponse::from_outcome(
            self.scheduler.trigger_manual_rotation(),
        ))
    }

    /// Current rotation status, including what was last written to disk
    /// when the store is file-backed.
    #[must_use]
    pub fn status(&self) -> RotationStatus {
        let pair = self.manager().all_verification_keys();
        let persisted = self.files.as_ref().and_then(|files| {
            files
                .read_metadata()
                .inspect_err(|e| warn!(error = %e, "Cannot read rotation metadata"))
                .ok()
                .flatten()
        });
        RotationStatus::new(
            &self.scheduler.stats(),
            pair.primary().key_id(),
            pair.secondary().key_id(),
        )
        .with_persisted(persisted.as_ref())
    }

    fn ensure_writer(&self) -> Result<()> {
        match self.access {
            Access::Writer { .. } => Ok(()),
            Access::ReadOnly => Err(ServiceError::ReadOnly {
                path: self.config.storage.directory.clone(),
            }),
        }
    }
}
