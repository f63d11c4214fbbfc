//! Error types for node balancing and peer redistribution.

/// Failures raised by the energy core.
///
/// Validation happens before any computation, so a returned error never
/// leaves a node half-updated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnergyError {
    /// An input value is negative, non-finite, or outside its allowed range.
    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter {
        /// Name of the offending field (e.g. `"charge_efficiency"`).
        field: &'static str,
        /// Human-readable constraint description.
        message: String,
    },

    /// Two nodes in the same run share an id.
    #[error("duplicate node id \"{id}\"")]
    DuplicateNode { id: String },

    /// A node failed validation; wraps the underlying cause.
    #[error("node \"{id}\": {source}")]
    Node {
        id: String,
        #[source]
        source: Box<EnergyError>,
    },
}

impl EnergyError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            message: message.into(),
        }
    }

    /// Attaches a node id to this error.
    pub fn for_node(self, id: &str) -> Self {
        Self::Node {
            id: id.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost field name for parameter errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(field),
            Self::Node { source, .. } => source.field(),
            Self::DuplicateNode { .. } => None,
        }
    }
}

/// Checks that `value` is finite and `>= 0`.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), EnergyError> {
    if !value.is_finite() {
        return Err(EnergyError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(EnergyError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(())
}

/// Checks that `value` is finite and `> 0`.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), EnergyError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EnergyError::invalid(field, format!("must be > 0, got {value}")));
    }
    Ok(())
}

/// Checks that a group total did not overflow to infinity.
pub(crate) fn ensure_finite_total(field: &'static str, total: f64) -> Result<(), EnergyError> {
    if !total.is_finite() {
        return Err(EnergyError::invalid(
            field,
            format!("group total must be finite, got {total}"),
        ));
    }
    Ok(())
}

/// Checks that an efficiency lies in `(0, 1]`.
pub(crate) fn ensure_efficiency(field: &'static str, value: f64) -> Result<(), EnergyError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(EnergyError::invalid(
            field,
            format!("must be in (0, 1], got {value}"),
        ));
    }
    Ok(())
}
