/// Configuration macros for zero-repetition config definitions
///
/// `config_struct!` declares a configuration section with its defaults inline.

/// Define a configuration struct with embedded defaults
///
/// Generates:
/// - The struct with public fields
/// - A `Default` implementation with the specified values
/// - Serde support with `#[serde(default)]`, so partially written TOML
///   sections fall back to the defaults field by field
///
/// # Example
/// ```
/// eventsync::config_struct! {
///     pub struct RetryConfig {
///         attempts: u32 = 3,
///         enabled: bool = true,
///     }
/// }
///
/// assert_eq!(RetryConfig::default().attempts, 3);
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
