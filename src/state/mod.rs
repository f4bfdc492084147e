/// State management module
///
/// This module holds the application's data model:
/// - Source image, compressed result and notices (data.rs)
/// - Quality level and the slider/text input model (quality.rs)

pub mod data;
pub mod quality;
