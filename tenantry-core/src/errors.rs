//! # Errors
//!
//! Tenantry carries structured errors inside `anyhow::Error` so they flow
//! unchanged through the hook pipeline. Transports decide how to render
//! them; with feature `serde` enabled, [`TenantryError::to_json`] produces
//! the wire body used by the HTTP adapter.

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for Tenantry core APIs.
pub type TenantryResult<T> = std::result::Result<T, AnyError>;

/// Client-facing message for any absent row, whatever the entity or tenant.
pub const OBJECT_NOT_FOUND: &str = "Object not found.";

/// Message for requests whose hostname or domain selector matches no tenant.
pub const NO_TENANT: &str = "No tenant for hostname.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotFound,         // 404
    MethodNotAllowed, // 405
    Conflict,         // 409
    Unprocessable,    // 422
    GeneralError,     // 500
    NotImplemented,   // 501
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotFound => "not-found",
            ErrorKind::MethodNotAllowed => "method-not-allowed",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
        }
    }
}

#[cfg(feature = "serde")]
pub type ErrorValue = serde_json::Value;

#[cfg(not(feature = "serde"))]
pub type ErrorValue = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// A structured error that can live inside `anyhow::Error`.
///
/// `errors` holds field-level detail (`{"name": ["is required"]}`), `data`
/// any extra payload, and `source` the internal cause, which is never sent
/// to clients.
#[derive(Debug)]
pub struct TenantryError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<ErrorValue>,
    pub errors: Option<ErrorValue>,
    pub source: Option<AnyError>,
}

impl TenantryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            errors: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: ErrorValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: ErrorValue) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `TenantryError` anywhere in an anyhow chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&TenantryError> {
        err.chain().find_map(|e| e.downcast_ref::<TenantryError>())
    }

    /// True if `err` carries a `NotFound` error.
    pub fn is_not_found(err: &AnyError) -> bool {
        Self::from_anyhow(err).is_some_and(|e| e.kind == ErrorKind::NotFound)
    }

    /// Keep a `TenantryError` as is; wrap anything else as `GeneralError`.
    pub fn normalize(err: AnyError) -> TenantryError {
        match err.downcast::<TenantryError>() {
            Ok(e) => e,
            Err(other) => {
                TenantryError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// Copy suitable for clients: the internal `source` is dropped.
    pub fn sanitize_for_client(&self) -> TenantryError {
        TenantryError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }

    /// The uniform "record absent in the active partition" error.
    pub fn object_not_found() -> Self {
        Self::not_found(OBJECT_NOT_FOUND)
    }

    /// The request's hostname or domain selector matched no tenant.
    pub fn unresolved_tenant() -> Self {
        Self::not_found(NO_TENANT)
    }
}

impl fmt::Display for TenantryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for TenantryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "serde")]
impl TenantryError {
    /// Wire body: `detail` plus the structured fields.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "detail": self.message,
            "name": self.name(),
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }
}

/// Return early with a `TenantryError` built from one of its constructors.
#[macro_export]
macro_rules! bail_tenantry {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::TenantryError::$ctor($msg).into_anyhow())
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::TenantryError::$ctor(format!($fmt, $($arg)*)).into_anyhow())
    };
}
