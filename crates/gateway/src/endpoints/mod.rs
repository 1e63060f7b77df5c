//! # Gatewayエンドポイント

pub mod upload_url;
pub mod upload_image;
pub mod images;
pub mod image_url;

pub use upload_url::handle_upload_url;
pub use upload_image::handle_upload_image;
pub use images::handle_images;
pub use image_url::handle_image_url;
