//! Declarative helpers for the string-backed enums stored as Postgres enums.

/// Define a lowercase string enum mapped to a Postgres enum type.
///
/// Generates the enum with `serde` and `sqlx::Type` derives, `ALL`,
/// `as_str`, `Display`, and a `FromStr` that reports the accepted values.
macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($pg_type:literal, $label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[sqlx(type_name = $pg_type, rename_all = "lowercase")]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the value as stored in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = fleetdesk_core::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $( $text => Ok(Self::$variant), )+
                    _ => Err(fleetdesk_core::AppError::validation(format!(
                        "Invalid {}: '{}'. Expected one of: {}",
                        $label,
                        s,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}
