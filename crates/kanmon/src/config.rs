use crate::{
    error::{ConfigError, Result},
    executor::{Executor, InlineExecutor, ThreadExecutor, TokioExecutor},
    receiver::ReceiverBuilder,
};
use serde::Deserialize;
use std::{fmt, str::FromStr, sync::Arc};

pub const ENV_INTENT_ACTION: &str = "KANMON_INTENT_ACTION";
pub const ENV_RECEIVER_NAME: &str = "KANMON_RECEIVER_NAME";
pub const ENV_EXECUTOR: &str = "KANMON_EXECUTOR";
pub const ENV_THREAD_NAME: &str = "KANMON_THREAD_NAME";

const DEFAULT_THREAD_NAME: &str = "kanmon-worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// tokio's blocking pool on the runtime current at build time
    Tokio,
    #[default]
    Thread,
    Inline,
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tokio => "tokio",
            Self::Thread => "thread",
            Self::Inline => "inline",
        };
        f.write_str(name)
    }
}

impl FromStr for ExecutorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tokio" => Ok(Self::Tokio),
            "thread" => Ok(Self::Thread),
            "inline" => Ok(Self::Inline),
            _ => Err(ConfigError::UnknownExecutor(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceiverConfig {
    pub intent_action: String,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub executor: ExecutorKind,
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_thread_name() -> String {
    DEFAULT_THREAD_NAME.to_string()
}

impl ReceiverConfig {
    pub fn new(intent_action: impl Into<String>) -> Self {
        Self {
            intent_action: intent_action.into(),
            receiver_name: None,
            executor: ExecutorKind::default(),
            thread_name: default_thread_name(),
        }
    }

    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::new()
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the same keys as [`ReceiverConfig::from_env`] from any source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let intent_action =
            lookup(ENV_INTENT_ACTION).ok_or_else(|| ConfigError::MissingVariable(ENV_INTENT_ACTION.to_string()))?;
        let executor = match lookup(ENV_EXECUTOR) {
            Some(kind) => kind.parse()?,
            None => ExecutorKind::default(),
        };
        let config = Self {
            intent_action,
            receiver_name: lookup(ENV_RECEIVER_NAME).filter(|name| !name.is_empty()),
            executor,
            thread_name: lookup(ENV_THREAD_NAME).unwrap_or_else(default_thread_name),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.intent_action.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "intent action cannot be empty".to_string(),
            ));
        }
        if self.executor == ExecutorKind::Thread && self.thread_name.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "thread name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the configured executor. `Tokio` needs to be called from inside a runtime.
    pub fn build_executor(&self) -> Result<Arc<dyn Executor>> {
        match self.executor {
            ExecutorKind::Tokio => TokioExecutor::current()
                .map(|executor| Arc::new(executor) as Arc<dyn Executor>)
                .ok_or_else(|| {
                    ConfigError::InvalidConfiguration("tokio executor requires a running runtime".to_string())
                }),
            ExecutorKind::Thread => Ok(Arc::new(ThreadExecutor::new(self.thread_name.clone()))),
            ExecutorKind::Inline => Ok(Arc::new(InlineExecutor)),
        }
    }

    /// A receiver builder with action, name and executor filled in; only the task is left.
    pub fn receiver_builder(&self) -> Result<ReceiverBuilder> {
        self.validate()?;
        let mut builder = ReceiverBuilder::new(self.intent_action.clone()).shared_executor(self.build_executor()?);
        if let Some(name) = &self.receiver_name {
            builder = builder.name(name.clone());
        }
        Ok(builder)
    }
}

#[derive(Debug, Default)]
pub struct ReceiverConfigBuilder {
    intent_action: Option<String>,
    receiver_name: Option<String>,
    executor: Option<ExecutorKind>,
    thread_name: Option<String>,
}

impl ReceiverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent_action(mut self, intent_action: impl Into<String>) -> Self {
        self.intent_action = Some(intent_action.into());
        self
    }

    pub fn receiver_name(mut self, receiver_name: impl Into<String>) -> Self {
        self.receiver_name = Some(receiver_name.into());
        self
    }

    pub fn executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = Some(thread_name.into());
        self
    }

    pub fn build(self) -> Result<ReceiverConfig> {
        let intent_action = self
            .intent_action
            .ok_or_else(|| ConfigError::InvalidConfiguration("intent action is required".to_string()))?;
        let config = ReceiverConfig {
            intent_action,
            receiver_name: self.receiver_name,
            executor: self.executor.unwrap_or_default(),
            thread_name: self.thread_name.unwrap_or_else(default_thread_name),
        };
        config.validate()?;
        Ok(config)
    }
}
