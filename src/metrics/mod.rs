pub mod accuracy;

pub use accuracy::{accuracy, detection_accuracy, detection_exact_match, exact_match, DETECTION_WINDOW};
