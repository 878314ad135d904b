pub mod keyvec;
pub mod peek;

/// Inline YAML snapshot of `$output`, with the source text attached as the
/// snapshot's info. The calling crate needs `insta` with the `yaml` feature.
#[macro_export]
macro_rules! assert_yaml_snapshot_with_source {
    ($source:expr => $output:expr, @$snapshot:literal) => {{
        insta::with_settings!({
            info => &$source,
            omit_expression => true,
        }, {
            insta::assert_yaml_snapshot!($output, @$snapshot);
        })
    }};
}
