//! 核心宏定义

/// 为配置结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use game_world::impl_default;
///
/// struct Limits {
///     max_emitters: usize,
///     label: String,
/// }
///
/// impl_default!(Limits {
///     max_emitters: 64,
///     label: String::from("bucket"),
/// });
///
/// assert_eq!(Limits::default().max_emitters, 64);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}
