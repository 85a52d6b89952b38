use thiserror::Error;

/// Errors surfaced by slot installation and delegate registration.
///
/// A result-bearing delegate declining to produce a value is *not* an error;
/// it returns `None` and the previous behavior applies.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DelegationError {
    /// `register` targeted a name/signature pair that was never installed.
    /// An absent name and a wrong signature family are indistinguishable to
    /// the caller.
    #[error("no delegatable method named '{name}' with signature '{signature}'")]
    NotDelegatable {
        name: String,
        signature: &'static str,
    },

    /// Policy token outside the accepted set.
    #[error("delegate policy must be one of 'before', 'after', or 'replace'; not '{0}'")]
    InvalidPolicy(String),

    /// The owning type installed the same method name twice. A defect in the
    /// host type's construction path, not a runtime condition.
    #[error("delegatable method '{0}' is already installed")]
    DuplicateInstall(String),
}
