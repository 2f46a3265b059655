//! Lookup from JSON-RPC error codes to failure kinds.
//!
//! The table starts with the JSON-RPC 2.0 reserved codes and the codes the
//! PLC web server documents for its `Api`, `PlcProgram` and login methods.
//! Callers register further codes with [`ErrorTaxonomy::insert`]; a code
//! with no entry maps to [`RpcErrorKind::Unknown`].

use std::{collections::HashMap, fmt};

/// Category of a JSON-RPC error reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RpcErrorKind {
    /// The session lacks the right to call the method.
    PermissionDenied,
    /// The server is busy and refused the call.
    SystemBusy,
    /// Credentials were rejected.
    LoginFailed,
    /// The session is already authenticated.
    AlreadyAuthenticated,
    /// The account password has expired.
    PasswordExpired,
    /// The addressed variable does not exist.
    AddressNotFound,
    /// The variable address is malformed.
    InvalidAddress,
    /// The variable is not a structure.
    NotAStructure,
    /// The array index is out of range.
    InvalidArrayIndex,
    /// The variable type cannot be accessed.
    UnsupportedAddress,
    /// The server could not parse the request JSON.
    ParseError,
    /// The request object is not valid JSON-RPC.
    InvalidRequest,
    /// The method does not exist.
    MethodNotFound,
    /// The parameters are invalid.
    InvalidParams,
    /// The server failed internally.
    InternalError,
    /// A kind registered by the caller.
    Custom(&'static str),
    /// No entry exists for the code.
    Unknown,
}

impl RpcErrorKind {
    /// Stable snake-case label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::SystemBusy => "system_busy",
            Self::LoginFailed => "login_failed",
            Self::AlreadyAuthenticated => "already_authenticated",
            Self::PasswordExpired => "password_expired",
            Self::AddressNotFound => "address_not_found",
            Self::InvalidAddress => "invalid_address",
            Self::NotAStructure => "not_a_structure",
            Self::InvalidArrayIndex => "invalid_array_index",
            Self::UnsupportedAddress => "unsupported_address",
            Self::ParseError => "parse_error",
            Self::InvalidRequest => "invalid_request",
            Self::MethodNotFound => "method_not_found",
            Self::InvalidParams => "invalid_params",
            Self::InternalError => "internal_error",
            Self::Custom(label) => label,
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

const BUILTIN: &[(i64, RpcErrorKind)] = &[
    (1, RpcErrorKind::PermissionDenied),
    (2, RpcErrorKind::SystemBusy),
    (100, RpcErrorKind::LoginFailed),
    (101, RpcErrorKind::AlreadyAuthenticated),
    (102, RpcErrorKind::PasswordExpired),
    (200, RpcErrorKind::AddressNotFound),
    (201, RpcErrorKind::InvalidAddress),
    (202, RpcErrorKind::NotAStructure),
    (203, RpcErrorKind::InvalidArrayIndex),
    (204, RpcErrorKind::UnsupportedAddress),
    (-32700, RpcErrorKind::ParseError),
    (-32600, RpcErrorKind::InvalidRequest),
    (-32601, RpcErrorKind::MethodNotFound),
    (-32602, RpcErrorKind::InvalidParams),
    (-32603, RpcErrorKind::InternalError),
];

/// Code-to-kind dispatch table.
#[derive(Debug, Clone)]
pub struct ErrorTaxonomy {
    kinds: HashMap<i64, RpcErrorKind>,
}

impl Default for ErrorTaxonomy {
    fn default() -> Self {
        Self {
            kinds: BUILTIN.iter().copied().collect(),
        }
    }
}

impl ErrorTaxonomy {
    /// A table with no entries; every code maps to [`RpcErrorKind::Unknown`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Register or replace the kind for `code`.
    ///
    /// # Examples
    ///
    /// ```
    /// use plcrpc::classify::{ErrorTaxonomy, RpcErrorKind};
    ///
    /// let mut table = ErrorTaxonomy::default();
    /// table.insert(1100, RpcErrorKind::Custom("webapp_invalid_name"));
    /// assert_eq!(table.kind_of(1100), RpcErrorKind::Custom("webapp_invalid_name"));
    /// ```
    pub fn insert(&mut self, code: i64, kind: RpcErrorKind) -> Option<RpcErrorKind> {
        self.kinds.insert(code, kind)
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, code: i64, kind: RpcErrorKind) -> Self {
        self.kinds.insert(code, kind);
        self
    }

    /// Look up the kind for `code`.
    #[must_use]
    pub fn kind_of(&self, code: i64) -> RpcErrorKind {
        self.kinds
            .get(&code)
            .copied()
            .unwrap_or(RpcErrorKind::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, RpcErrorKind::PermissionDenied)]
    #[case(200, RpcErrorKind::AddressNotFound)]
    #[case(-32601, RpcErrorKind::MethodNotFound)]
    #[case(9999, RpcErrorKind::Unknown)]
    fn default_table(#[case] code: i64, #[case] kind: RpcErrorKind) {
        assert_eq!(ErrorTaxonomy::default().kind_of(code), kind);
    }

    #[rstest]
    fn caller_entries_override_builtins() {
        let table = ErrorTaxonomy::default().with(2, RpcErrorKind::Custom("maintenance"));
        assert_eq!(table.kind_of(2), RpcErrorKind::Custom("maintenance"));
        assert_eq!(table.kind_of(2).to_string(), "maintenance");
    }

    #[rstest]
    fn empty_table_knows_nothing() {
        assert_eq!(ErrorTaxonomy::empty().kind_of(1), RpcErrorKind::Unknown);
    }
}
