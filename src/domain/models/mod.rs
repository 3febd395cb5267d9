pub mod existence;
pub mod file_path_descriptor;
pub mod upload_file;
pub mod upload_result;

pub use existence::{ExistencePredicate, WithTakenKeys};
pub use file_path_descriptor::{
    DEFAULT_MAX_RENAME_ATTEMPTS, FilePathDescriptor, FilePathDescriptorBuilder,
};
pub use upload_file::UploadFile;
pub use upload_result::{PutAck, UploadResult};
