use crate::errors::{ErrorKind, FlagError};
use std::fmt::{Display, Formatter};

/// A named boolean toggle together with the value used while the remote service is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDefinition {
    name: String,
    default_value: bool,
}

impl FlagDefinition {
    /// Creates a new [`FlagDefinition`].
    pub fn new(name: &str, default_value: bool) -> Self {
        Self {
            name: name.to_owned(),
            default_value,
        }
    }

    /// Name of the flag, unique within its [`FlagContainer`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the flag when no remote value is known.
    pub fn default_value(&self) -> bool {
        self.default_value
    }
}

/// The feature flags of the InsuranceStack UI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Top banner for important alerts and notifications.
    AlertsBanner,
    /// Advanced filtering for the claims list.
    ClaimsFilters,
    /// Advanced filtering for the payments list.
    PaymentsFilters,
    /// Policy detail modal with additional information.
    EnhancedPolicyView,
    /// Streamlined claim filing process.
    QuickClaimFiling,
}

impl Flag {
    /// Every declared flag, in declaration order.
    pub const ALL: [Flag; 5] = [
        Flag::AlertsBanner,
        Flag::ClaimsFilters,
        Flag::PaymentsFilters,
        Flag::EnhancedPolicyView,
        Flag::QuickClaimFiling,
    ];

    /// Name used to register and look up the flag.
    pub fn name(&self) -> &'static str {
        match self {
            Flag::AlertsBanner => "alertsBanner",
            Flag::ClaimsFilters => "claimsFilters",
            Flag::PaymentsFilters => "paymentsFilters",
            Flag::EnhancedPolicyView => "enhancedPolicyView",
            Flag::QuickClaimFiling => "quickClaimFiling",
        }
    }

    /// Compile-time default of the flag.
    pub fn default_value(&self) -> bool {
        !matches!(self, Flag::EnhancedPolicyView)
    }

    /// Returns the [`FlagDefinition`] of this flag.
    pub fn definition(&self) -> FlagDefinition {
        FlagDefinition::new(self.name(), self.default_value())
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of [`FlagDefinition`]s registered with an adapter under one namespace.
///
/// # Examples
///
/// ```rust
/// use insurance_flags::{FlagContainer, FlagDefinition};
///
/// let mut container = FlagContainer::new();
/// container.insert(FlagDefinition::new("darkMode", false)).unwrap();
///
/// assert_eq!(container.len(), 1);
/// assert!(container.insert(FlagDefinition::new("darkMode", true)).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagContainer {
    flags: Vec<FlagDefinition>,
}

impl FlagContainer {
    /// Creates an empty [`FlagContainer`].
    pub fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Creates the container holding every [`Flag`] of the application.
    pub fn insurance() -> Self {
        Self {
            flags: Flag::ALL.iter().map(Flag::definition).collect(),
        }
    }

    /// Appends a definition.
    ///
    /// # Errors
    ///
    /// Fails when a definition with the same name is already present.
    pub fn insert(&mut self, definition: FlagDefinition) -> Result<(), FlagError> {
        if self.get(definition.name()).is_some() {
            return Err(FlagError::new(
                ErrorKind::DuplicateFlag,
                format!("Flag '{}' is already declared.", definition.name()),
            ));
        }
        self.flags.push(definition);
        Ok(())
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Option<&FlagDefinition> {
        self.flags.iter().find(|def| def.name == name)
    }

    /// Iterates the definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FlagDefinition> {
        self.flags.iter()
    }

    /// Number of declared flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// True when no flag is declared.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
