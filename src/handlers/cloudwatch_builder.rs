//! Builder for [`FemtoCloudWatchHandler`](crate::cloudwatch::FemtoCloudWatchHandler).
//!
//! Collects the remote client, target group and stream, provider limits,
//! and the formatter and clock collaborators. Everything is validated before
//! the handler exists, so configuration errors never reach the remote
//! service.

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    clock::{Clock, SharedClock},
    cloudwatch::{CloudWatchHandlerConfig, FemtoCloudWatchHandler, LogServiceClient},
    formatter::{FemtoFormatter, SharedFormatter},
    level::FemtoLevel,
};

use super::{HandlerBuildError, HandlerBuilderTrait};

macro_rules! config_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.config.$field = value;
            self
        }
    };
}

/// Builder for constructing [`FemtoCloudWatchHandler`] instances.
#[derive(Clone, Default)]
pub struct CloudWatchHandlerBuilder {
    client: Option<Arc<dyn LogServiceClient>>,
    config: CloudWatchHandlerConfig,
    formatter: Option<SharedFormatter>,
    clock: Option<SharedClock>,
}

impl CloudWatchHandlerBuilder {
    /// Create a new builder with no client or target configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from a deserialized configuration.
    pub fn from_config(config: CloudWatchHandlerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the remote log service client (required).
    pub fn with_client<C>(self, client: C) -> Self
    where
        C: LogServiceClient + 'static,
    {
        self.with_shared_client(Arc::new(client))
    }

    /// Set a client already shared with other components.
    pub fn with_shared_client(mut self, client: Arc<dyn LogServiceClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the log group name (required).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.config.group = group.into();
        self
    }

    /// Set the log stream name (required).
    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.config.stream = stream.into();
        self
    }

    config_setter!(
        #[doc = "Retention in days applied when the group is created. Zero disables it."]
        with_retention_days,
        retention_days,
        u32
    );
    config_setter!(
        #[doc = "Events per batch, between 1 and 10000."]
        with_batch_size,
        batch_size,
        usize
    );
    config_setter!(
        #[doc = "Replace the tags attached to a newly created group."]
        with_tags,
        tags,
        BTreeMap<String, String>
    );
    config_setter!(
        #[doc = "Minimum level handled."]
        with_level,
        level,
        FemtoLevel
    );
    config_setter!(
        #[doc = "Whether handled records continue to later handlers."]
        with_bubble,
        bubble,
        bool
    );
    config_setter!(
        #[doc = "Whether a missing group is created on first flush."]
        with_create_group,
        create_group,
        bool
    );

    /// Add a single group tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.tags.insert(key.into(), value.into());
        self
    }

    /// Format records with `formatter` instead of the default line format.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: FemtoFormatter + 'static,
    {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    /// Use `clock` for rate limiting instead of the system clock.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Some(SharedClock::new(clock));
        self
    }

    /// Current configuration, as it will be validated by `build`.
    pub fn config(&self) -> &CloudWatchHandlerConfig {
        &self.config
    }

    fn validate(&self) -> Result<Arc<dyn LogServiceClient>, HandlerBuildError> {
        let client = self.client.clone().ok_or_else(|| {
            HandlerBuildError::InvalidConfig(
                "CloudWatch handler requires a log service client".into(),
            )
        })?;
        self.config.validate()?;
        Ok(client)
    }
}

impl HandlerBuilderTrait for CloudWatchHandlerBuilder {
    type Handler = FemtoCloudWatchHandler;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        let client = self.validate()?;
        FemtoCloudWatchHandler::with_parts(
            client,
            self.config.clone(),
            self.formatter.clone().unwrap_or_default(),
            self.clock.clone().unwrap_or_default(),
        )
    }
}

impl fmt::Debug for CloudWatchHandlerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudWatchHandlerBuilder")
            .field("client", &self.client.as_ref().map(|_| "<dyn LogServiceClient>"))
            .field("config", &self.config)
            .field("formatter", &self.formatter)
            .field("clock", &self.clock)
            .finish()
    }
}
