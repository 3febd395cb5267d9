mod attachment_category;
mod bucket_name;
mod object_key;

pub use attachment_category::AttachmentCategory;
pub use bucket_name::BucketName;
pub use object_key::{ObjectKey, normalize_prefix};
