use crate::models::submission::{ImageAttachment, NewReport, ReportDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub max_images: usize,
    pub min_phone_digits: usize,
    pub min_otp_length: usize,
    pub max_otp_length: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_images: 3,
            min_phone_digits: 10,
            min_otp_length: 4,
            max_otp_length: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing information: Please fill in all required fields.")]
    MissingFields { fields: Vec<&'static str> },

    #[error("Too many images: You can upload maximum {max} images per report.")]
    TooManyImages { max: usize },

    #[error("Invalid phone number: Please enter a valid {min_digits}-digit phone number.")]
    InvalidPhone { min_digits: usize },

    #[error("Invalid OTP: Please enter the complete verification code.")]
    InvalidOtp,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_draft(draft: &ReportDraft) -> Result<NewReport, ValidationError> {
    let mut missing = Vec::new();
    if is_blank(&draft.title) {
        missing.push("title");
    }
    if is_blank(&draft.description) {
        missing.push("description");
    }
    if draft.category.is_none() {
        missing.push("category");
    }

    let Some(category) = draft.category.filter(|_| missing.is_empty()) else {
        return Err(ValidationError::MissingFields { fields: missing });
    };

    Ok(NewReport {
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        category,
        location: draft.location.trim().to_string(),
        images: draft.images.clone(),
    })
}

/// Append a picked batch of photos. The whole batch is rejected when it
/// would take the report past `max` photos.
pub fn attach_images(
    existing: &[ImageAttachment],
    incoming: Vec<ImageAttachment>,
    max: usize,
) -> Result<Vec<ImageAttachment>, ValidationError> {
    if existing.len() + incoming.len() > max {
        return Err(ValidationError::TooManyImages { max });
    }
    let mut images = existing.to_vec();
    images.extend(incoming);
    Ok(images)
}

pub fn remove_image(images: &mut Vec<ImageAttachment>, index: usize) {
    if index < images.len() {
        images.remove(index);
    }
}

/// Returns the digits of the number.
pub fn validate_phone(phone: &str, limits: &ValidationLimits) -> Result<String, ValidationError> {
    let invalid = ValidationError::InvalidPhone {
        min_digits: limits.min_phone_digits,
    };
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    if !allowed {
        return Err(invalid);
    }

    let digits: String = body.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < limits.min_phone_digits {
        return Err(invalid);
    }
    Ok(digits)
}

pub fn validate_otp(otp: &str, limits: &ValidationLimits) -> Result<(), ValidationError> {
    let otp = otp.trim();
    let len = otp.chars().count();
    if len < limits.min_otp_length
        || len > limits.max_otp_length
        || !otp.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidOtp);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::Category;

    fn image(name: &str) -> ImageAttachment {
        ImageAttachment {
            file_name: name.to_string(),
        }
    }

    #[test]
    fn draft_requires_title_description_and_category() {
        let draft = ReportDraft {
            title: "  ".to_string(),
            description: "Cracked pavement".to_string(),
            category: None,
            ..ReportDraft::default()
        };
        let err = validate_draft(&draft).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["title", "category"]
            }
        );
        assert_eq!(err.to_string(), "Missing information: Please fill in all required fields.");
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let draft = ReportDraft {
            title: " Damaged Sidewalk ".to_string(),
            description: "Multiple cracks".to_string(),
            category: Some(Category::RoadIssues),
            location: "Elm Street ".to_string(),
            images: vec![image("crack.jpg")],
        };
        let report = validate_draft(&draft).expect("valid draft");
        assert_eq!(report.title, "Damaged Sidewalk");
        assert_eq!(report.location, "Elm Street");
        assert_eq!(report.images.len(), 1);
    }

    #[test]
    fn image_batches_respect_the_limit() {
        let existing = vec![image("a.jpg"), image("b.jpg")];
        let ok = attach_images(&existing, vec![image("c.jpg")], 3).expect("three fit");
        assert_eq!(ok.len(), 3);

        let err = attach_images(&existing, vec![image("c.jpg"), image("d.jpg")], 3).unwrap_err();
        assert_eq!(err, ValidationError::TooManyImages { max: 3 });
    }

    #[test]
    fn remove_image_ignores_out_of_range() {
        let mut images = vec![image("a.jpg"), image("b.jpg")];
        remove_image(&mut images, 5);
        assert_eq!(images.len(), 2);
        remove_image(&mut images, 0);
        assert_eq!(images, vec![image("b.jpg")]);
    }

    #[test]
    fn phone_numbers() {
        let limits = ValidationLimits::default();
        assert_eq!(validate_phone("98765 43210", &limits).unwrap(), "9876543210");
        assert_eq!(validate_phone("+1 (555) 123-4567", &limits).unwrap(), "15551234567");
        assert!(validate_phone("", &limits).is_err());
        assert!(validate_phone("12345", &limits).is_err());
        assert!(validate_phone("98765abc43210", &limits).is_err());
    }

    #[test]
    fn otp_length_and_digits() {
        let limits = ValidationLimits::default();
        assert!(validate_otp("1234", &limits).is_ok());
        assert!(validate_otp("123456", &limits).is_ok());
        assert_eq!(validate_otp("123", &limits), Err(ValidationError::InvalidOtp));
        assert_eq!(validate_otp("1234567", &limits), Err(ValidationError::InvalidOtp));
        assert_eq!(validate_otp("12a4", &limits), Err(ValidationError::InvalidOtp));
    }
}
