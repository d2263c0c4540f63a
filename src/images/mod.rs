/// Image browsing module
///
/// This module handles:
/// - Scanning a folder for images and navigating the sorted list
/// - Decoding the selected image to RGBA
/// - Cutting out the magnifier region under the cursor

pub mod decode;
pub mod library;

pub use decode::{decode_async, magnifier_region, DecodedImage};
pub use library::ImageLibrary;
