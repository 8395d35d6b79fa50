use thiserror::Error;

use crate::{ImageId, PageId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("page {0} no longer exists")]
    PageNotFound(PageId),
    #[error("page {page} has no pending request for image {image}")]
    UnknownImageRequest { page: PageId, image: ImageId },
}
