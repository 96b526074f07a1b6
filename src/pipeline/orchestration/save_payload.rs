use crate::error::AppError;
use crate::pipeline::types::{
    AcquiredImage, EnhancedAttributes, ImageFile, InferredProfile, SaveImage, SaveRequest,
    DEFAULT_UPLOAD_NAME, FALLBACK_SAVE_CATEGORY,
};

/// Persistence payload for the current image: overrides first, then the
/// inferred profile, then fixed defaults.
pub fn build_save_request(
    image: &AcquiredImage,
    enhanced: Option<&EnhancedAttributes>,
    profile: &InferredProfile,
) -> Result<SaveRequest, AppError> {
    let no_overrides = EnhancedAttributes::default();
    let enhanced = enhanced.unwrap_or(&no_overrides);

    let name = enhanced
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| profile.name.clone());
    let category = enhanced
        .category()
        .map(str::to_string)
        .or_else(|| profile.category.clone())
        .unwrap_or_else(|| FALLBACK_SAVE_CATEGORY.to_string());

    Ok(SaveRequest {
        name,
        category,
        brand: enhanced.brand().unwrap_or_default().to_string(),
        description: enhanced.description().unwrap_or_default().to_string(),
        colors: enhanced.colors().map(<[String]>::to_vec).unwrap_or_default(),
        tags: enhanced.tags().map(<[String]>::to_vec).unwrap_or_default(),
        image: upload_image(image)?,
    })
}

fn upload_image(image: &AcquiredImage) -> Result<SaveImage, AppError> {
    if image.reference.is_remote_url() {
        return Ok(SaveImage::Url(image.reference.as_str().to_string()));
    }
    if let Some(file) = &image.file {
        return Ok(SaveImage::File(file.clone()));
    }

    let (mime, bytes) = image
        .reference
        .decode_data()
        .ok_or_else(|| AppError::Save("Image could not be prepared for upload".to_string()))?;
    Ok(SaveImage::File(ImageFile {
        file_name: DEFAULT_UPLOAD_NAME.to_string(),
        mime,
        bytes,
    }))
}
