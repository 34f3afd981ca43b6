use thiserror::Error;

pub type Result<T> = std::result::Result<T, InjectaError>;

#[derive(Debug, Error)]
pub enum InjectaError {
    #[error("Dependency not found: {name}")]
    DependencyNotFound { name: String },

    #[error("Failed to downcast dependency '{name}' to {type_name}")]
    DowncastFailed { name: String, type_name: String },

    /// Reported by `Construct` impls that reject their resolved arguments.
    #[error("Factory '{name}' failed: {message}")]
    FactoryFailed { name: String, message: String },
}

impl InjectaError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::DependencyNotFound { name: name.into() }
    }

    pub fn downcast_failed<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::DowncastFailed {
            name: name.into(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    pub fn factory_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FactoryFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}
