//! Typed settings resolved from the process environment.
//!
//! A [`Setting`] is a plain value definition: a field name, a compiled-in default and an
//! optional alias variable. Nothing is cached. Every call to [`Setting::resolve`] reads the
//! environment again, so a value only changes if the environment does.

use std::env::{self, VarError};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::SettingError;

/// Prefix shared by every canonical environment variable name.
pub const NAMESPACE: &str = "E6C";

/// The closed set of value types a setting can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    String,
    Integer,
    Float,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SettingKind::String => "string",
            SettingKind::Integer => "integer",
            SettingKind::Float => "float",
        })
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for &'static str {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// Default-value types a [`Setting`] can be declared with, each with its own parser.
pub trait SettingType: sealed::Sealed + Copy + fmt::Debug + Send + Sync + 'static {
    /// What [`Setting::resolve`] hands back.
    type Value: fmt::Debug + fmt::Display + Clone + PartialEq;

    const KIND: SettingKind;

    fn parse(raw: &str) -> Result<Self::Value, String>;

    fn to_value(self) -> Self::Value;
}

impl SettingType for &'static str {
    type Value = String;

    const KIND: SettingKind = SettingKind::String;

    fn parse(raw: &str) -> Result<String, String> {
        Ok(raw.to_owned())
    }

    fn to_value(self) -> String {
        self.to_owned()
    }
}

impl SettingType for i64 {
    type Value = i64;

    const KIND: SettingKind = SettingKind::Integer;

    fn parse(raw: &str) -> Result<i64, String> {
        raw.trim().parse().map_err(|e| format!("{e}"))
    }

    fn to_value(self) -> i64 {
        self
    }
}

impl SettingType for f64 {
    type Value = f64;

    const KIND: SettingKind = SettingKind::Float;

    fn parse(raw: &str) -> Result<f64, String> {
        raw.trim().parse().map_err(|e| format!("{e}"))
    }

    fn to_value(self) -> f64 {
        self
    }
}

/// One named configuration value with an environment override.
///
/// Declared once at process scope:
///
/// ```
/// use ekrhizoc_core::settings::Setting;
///
/// static RETRIES: Setting<i64> = Setting::new("retries", 3).describe("Attempts per url");
///
/// assert_eq!(RETRIES.name(), "E6C_RETRIES");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Setting<T: SettingType> {
    field: &'static str,
    default: T,
    env_var_alias: Option<&'static str>,
    description: Option<&'static str>,
}

impl<T: SettingType> Setting<T> {
    pub const fn new(field: &'static str, default: T) -> Self {
        Self {
            field,
            default,
            env_var_alias: None,
            description: None,
        }
    }

    /// Secondary variable consulted when the canonical one is unset.
    pub const fn alias(mut self, var: &'static str) -> Self {
        self.env_var_alias = Some(var);
        self
    }

    pub const fn describe(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }

    /// Canonical environment variable, e.g. `log_level` -> `E6C_LOG_LEVEL`.
    pub fn name(&self) -> String {
        let field: String = self
            .field
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{NAMESPACE}_{field}")
    }

    pub fn kind(&self) -> SettingKind {
        T::KIND
    }

    pub fn env_var_alias(&self) -> Option<&'static str> {
        self.env_var_alias
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    pub fn default_value(&self) -> T::Value {
        self.default.to_value()
    }

    /// Returns the variable that supplied a value and its raw text, if any did.
    ///
    /// The alias is only consulted when the canonical variable is not set at all. A variable
    /// set to the empty string supplies no value, so a set-but-empty canonical variable
    /// resolves to the default without looking at the alias.
    pub fn lookup(&self) -> Result<Option<(String, String)>, SettingError> {
        let primary = self.name();
        if let Some(raw) = read_var(&primary)? {
            return Ok((!raw.is_empty()).then_some((primary, raw)));
        }
        if let Some(alias) = self.env_var_alias {
            if let Some(raw) = read_var(alias)? {
                return Ok((!raw.is_empty()).then(|| (alias.to_owned(), raw)));
            }
        }
        Ok(None)
    }

    /// Resolve the current value: canonical variable, then alias, then default.
    pub fn resolve(&self) -> Result<T::Value, SettingError> {
        match self.lookup()? {
            Some((var, raw)) => T::parse(&raw).map_err(|reason| SettingError::Invalid {
                var,
                value: raw,
                kind: T::KIND,
                reason,
            }),
            None => Ok(self.default_value()),
        }
    }
}

impl<T: SettingType> PartialEq for Setting<T> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
    }
}

impl<T: SettingType> Eq for Setting<T> {}

impl<T: SettingType> Hash for Setting<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.field.hash(state);
    }
}

fn read_var(var: &str) -> Result<Option<String>, SettingError> {
    match env::var(var) {
        Ok(raw) => Ok(Some(raw)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(SettingError::NotUnicode {
            var: var.to_owned(),
        }),
    }
}

/// Type-erased view of a [`Setting`], used to list settings of mixed types together.
pub trait SettingInfo: Sync {
    fn name(&self) -> String;
    fn kind(&self) -> SettingKind;
    fn env_var_alias(&self) -> Option<&'static str>;
    fn description(&self) -> Option<&'static str>;
    fn default_display(&self) -> String;
    fn resolve_display(&self) -> Result<String, SettingError>;
}

impl<T: SettingType> SettingInfo for Setting<T> {
    fn name(&self) -> String {
        Setting::name(self)
    }

    fn kind(&self) -> SettingKind {
        Setting::kind(self)
    }

    fn env_var_alias(&self) -> Option<&'static str> {
        Setting::env_var_alias(self)
    }

    fn description(&self) -> Option<&'static str> {
        Setting::description(self)
    }

    fn default_display(&self) -> String {
        self.default_value().to_string()
    }

    fn resolve_display(&self) -> Result<String, SettingError> {
        self.resolve().map(|v| v.to_string())
    }
}
