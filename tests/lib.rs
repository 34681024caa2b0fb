/// Integration tests
/// Run a single group with `cargo test <module>`, e.g. `cargo test integration::prediction_test`
pub mod utils;

pub mod integration {
    pub mod cohort_test;
    pub mod prediction_test;
    pub mod report_test;
}
