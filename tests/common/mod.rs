/// Expands to the absolute path of a fixture file under `resources/test/`.
#[macro_export]
macro_rules! test_case {
    ($fname:expr) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test/", $fname)
    };
}
