use crate::commands::gateway::CivicGateway;
use crate::commands::reports::SharedBoard;
use crate::interaction::validation::{
    attach_images, remove_image, validate_draft, ValidationError, ValidationLimits,
};
use crate::models::report::Report;
use crate::models::submission::{ImageAttachment, ReportDraft};

#[cfg(feature = "desktop")]
use crate::commands::{
    reports::SharedGateway,
    settings::{current_limits, SharedSettings},
};

pub async fn detect_location_internal(gateway: &dyn CivicGateway) -> Result<String, String> {
    gateway.detect_location().await.map_err(|e| e.to_string())
}

pub fn validate_images_internal(
    existing: &[ImageAttachment],
    incoming: Vec<ImageAttachment>,
    limits: &ValidationLimits,
) -> Result<Vec<ImageAttachment>, String> {
    attach_images(existing, incoming, limits.max_images).map_err(|e| e.to_string())
}

pub fn remove_image_internal(mut images: Vec<ImageAttachment>, index: usize) -> Vec<ImageAttachment> {
    remove_image(&mut images, index);
    images
}

pub async fn submit_report_internal(
    board: &SharedBoard,
    gateway: &dyn CivicGateway,
    draft: &ReportDraft,
    limits: &ValidationLimits,
) -> Result<Report, String> {
    let new_report = validate_draft(draft).map_err(|e| e.to_string())?;
    if new_report.images.len() > limits.max_images {
        return Err(ValidationError::TooManyImages {
            max: limits.max_images,
        }
        .to_string());
    }

    let report = gateway
        .submit_report(new_report)
        .await
        .map_err(|e| format!("Submission failed: {e}"))?;

    let mut board = board.lock().map_err(|_| "Board lock error".to_string())?;
    board.push_mine(report.clone());
    Ok(report)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn detect_location(gateway: tauri::State<'_, SharedGateway>) -> Result<String, String> {
    detect_location_internal(gateway.inner().as_ref()).await
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn validate_images(
    existing: Vec<ImageAttachment>,
    incoming: Vec<ImageAttachment>,
    settings: tauri::State<'_, SharedSettings>,
) -> Result<Vec<ImageAttachment>, String> {
    let limits = current_limits(settings.inner())?;
    validate_images_internal(&existing, incoming, &limits)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn remove_image_at(images: Vec<ImageAttachment>, index: usize) -> Vec<ImageAttachment> {
    remove_image_internal(images, index)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn submit_report(
    draft: ReportDraft,
    board: tauri::State<'_, SharedBoard>,
    gateway: tauri::State<'_, SharedGateway>,
    settings: tauri::State<'_, SharedSettings>,
) -> Result<Report, String> {
    let limits = current_limits(settings.inner())?;
    submit_report_internal(board.inner(), gateway.inner().as_ref(), &draft, &limits).await
}
