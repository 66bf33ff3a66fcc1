use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    image::{
        entities::{EncodedImage, RawImage},
        value_objects::NormalizeOptions,
    },
};

/// Turns an arbitrary user photo into a size-bounded inline image.
#[cfg_attr(test, mockall::automock)]
pub trait ImageNormalizer: Send + Sync {
    fn normalize(
        &self,
        raw: RawImage,
        options: NormalizeOptions,
    ) -> impl Future<Output = Result<EncodedImage, CoreError>> + Send;
}
