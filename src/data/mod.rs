pub mod csv;
pub mod dataset;
pub mod image;

pub use self::csv::{load_csv, parse_csv, LabelMode};
pub use self::dataset::{Dataset, InMemoryDataset, Sample};
pub use self::image::{ColorMode, ImageDataset, ImageOptions};
