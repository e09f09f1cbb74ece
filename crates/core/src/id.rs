// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID newtypes and generation.
//!
//! Store-generated ids (`ProjectId`, `FragmentId`) carry a short type prefix
//! followed by a random nanoid. Provider-assigned ids (`SandboxId`,
//! `SnapshotImageId`) wrap whatever string the sandbox runtime hands back.

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        s
    } else {
        &s[..n]
    }
}

/// Define a newtype ID wrapper around `SmolStr`.
///
/// Two forms:
/// - `pub struct Name("pfx-");` — store-generated: `new()` produces
///   `pfx-<19-char nanoid>` (23 chars total, fits SmolStr inline capacity).
/// - `pub struct Name;` — externally assigned: `new(s)` wraps the given
///   string verbatim.
///
/// Both generate `from_string()`, `as_str()`, `Display`, `From<&str>`,
/// `From<String>`, `AsRef<str>`, `PartialEq<str>`, and `Borrow<str>`.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $crate::define_id!(@shared $(#[$meta])* $name);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random ID with the type prefix.
            pub fn new() -> Self {
                Self(smol_str::SmolStr::new(format!(
                    "{}{}",
                    Self::PREFIX,
                    nanoid::nanoid!(19)
                )))
            }

            /// The ID without its type prefix.
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };

    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $crate::define_id!(@shared $(#[$meta])* $name);

        impl $name {
            /// Wrap an externally assigned identifier.
            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }
        }
    };

    (@shared $(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            /// Create ID from an existing string (for parsing/deserialization).
            pub fn from_string(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Provider-assigned identifier for a live sandbox instance.
    pub struct SandboxId;
}

crate::define_id! {
    /// Provider-assigned identifier for a filesystem snapshot image.
    pub struct SnapshotImageId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
