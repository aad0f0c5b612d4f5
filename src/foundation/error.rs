/// Convenience result type used across dynamask.
pub type DynamaskResult<T> = Result<T, DynamaskError>;

/// Top-level error taxonomy used by the filter stage.
///
/// All of these are recovered locally within a single tick or render call —
/// logged and converted into a skip signal, never escalated to the host.
#[derive(thiserror::Error, Debug)]
pub enum DynamaskError {
    /// A source produced no valid texture or zero-sized output.
    #[error("capture error: {0}")]
    Capture(String),

    /// A named secondary source could not be resolved, or binding it would
    /// create a render cycle.
    #[error("binding error: {0}")]
    Binding(String),

    /// An expected named parameter is absent from a shader program.
    #[error("shader parameter error: {0}")]
    ShaderParameter(String),

    /// Zero width or height somewhere in the capture chain.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// Invalid construction or configuration input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DynamaskError {
    /// Build a [`DynamaskError::Capture`] value.
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`DynamaskError::Binding`] value.
    pub fn binding(msg: impl Into<String>) -> Self {
        Self::Binding(msg.into())
    }

    /// Build a [`DynamaskError::ShaderParameter`] value.
    pub fn shader_parameter(msg: impl Into<String>) -> Self {
        Self::ShaderParameter(msg.into())
    }

    /// Build a [`DynamaskError::Dimension`] value.
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::Dimension(msg.into())
    }

    /// Build a [`DynamaskError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
