#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use deriche_image as image;

#[doc(inline)]
pub use deriche_imgproc as imgproc;
