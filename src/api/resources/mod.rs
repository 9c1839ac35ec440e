//
//  gitlab-tools
//  api/resources/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # GitLab Resources
//!
//! One module per remote resource. Each module holds three things:
//!
//! - The remote shape (`GitLab*` structs), deserialized from the snake_case
//!   JSON GitLab returns
//! - The normalized shape, serialized as camelCase for tool output
//! - A `From` mapper between the two and the [`GitLabClient`](super::GitLabClient)
//!   methods that fetch them
//!
//! Mappers are pure functions, so they are tested without a server.

/// Declares a closed set of query values with their wire spelling.
///
/// Generates `as_str`, `Display` and a case-insensitive `FromStr` that
/// reports the accepted values on failure. Declared ahead of the resource
/// modules so they can use it.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// All values in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The value as GitLab spells it.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::api::common::ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let accepted: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        $crate::api::common::ApiError::validation(
                            $field,
                            format!("'{}' is not one of: {}", s, accepted.join(", ")),
                        )
                    })
            }
        }
    };
}

pub mod commits;
pub mod jobs;
pub mod members;
pub mod merge_requests;
pub mod pipelines;
pub mod projects;
pub mod tags;
pub mod users;

pub use commits::*;
pub use jobs::*;
pub use members::*;
pub use merge_requests::*;
pub use pipelines::*;
pub use projects::*;
pub use tags::*;
pub use users::*;

wire_enum! {
    /// Sort direction for listings.
    SortDirection, "sort" {
        Asc => "asc",
        Desc => "desc",
    }
}
