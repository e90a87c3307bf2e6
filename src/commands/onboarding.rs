use crate::commands::gateway::{CivicGateway, GatewayError};
use crate::interaction::validation::{validate_otp, validate_phone, ValidationError, ValidationLimits};
use crate::models::session::{OnboardingState, OnboardingStep, Session};
use std::sync::{Arc, Mutex};

#[cfg(feature = "desktop")]
use crate::commands::{
    reports::SharedGateway,
    settings::{current_limits, SharedSettings},
};

pub type SharedOnboarding = Arc<Mutex<OnboardingState>>;

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("Cannot {action} from the {step} step")]
    WrongStep { action: &'static str, step: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Onboarding lock error")]
    Lock,
}

fn step_name(step: &OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::Welcome => "welcome",
        OnboardingStep::ChooseMethod => "choose method",
        OnboardingStep::VerifyOtp { .. } => "verify OTP",
        OnboardingStep::Complete => "complete",
    }
}

fn wrong_step(action: &'static str, step: &OnboardingStep) -> OnboardingError {
    OnboardingError::WrongStep {
        action,
        step: step_name(step),
    }
}

fn current_step(flow: &SharedOnboarding) -> Result<OnboardingStep, OnboardingError> {
    Ok(flow.lock().map_err(|_| OnboardingError::Lock)?.step.clone())
}

fn move_step(
    flow: &SharedOnboarding,
    action: &'static str,
    next: impl FnOnce(&OnboardingStep) -> Option<OnboardingStep>,
) -> Result<OnboardingState, OnboardingError> {
    let mut state = flow.lock().map_err(|_| OnboardingError::Lock)?;
    let Some(step) = next(&state.step) else {
        return Err(wrong_step(action, &state.step));
    };
    state.step = step;
    Ok(state.clone())
}

// Gateway calls release the lock while they wait. The flow only moves on if
// nothing else moved it in the meantime.
fn advance_from(
    flow: &SharedOnboarding,
    expected: &OnboardingStep,
    action: &'static str,
    step: OnboardingStep,
    session: Option<Session>,
) -> Result<OnboardingState, OnboardingError> {
    let mut state = flow.lock().map_err(|_| OnboardingError::Lock)?;
    if state.step != *expected {
        log::warn!("onboarding moved to {} while waiting to {action}", step_name(&state.step));
        return Err(wrong_step(action, &state.step));
    }
    state.step = step;
    if session.is_some() {
        state.session = session;
    }
    Ok(state.clone())
}

pub fn onboarding_state_internal(flow: &SharedOnboarding) -> Result<OnboardingState, OnboardingError> {
    Ok(flow.lock().map_err(|_| OnboardingError::Lock)?.clone())
}

pub fn get_started_internal(flow: &SharedOnboarding) -> Result<OnboardingState, OnboardingError> {
    move_step(flow, "get started", |step| match step {
        OnboardingStep::Welcome => Some(OnboardingStep::ChooseMethod),
        _ => None,
    })
}

// VerifyOtp goes back to ChooseMethod so the number can be changed.
pub fn back_internal(flow: &SharedOnboarding) -> Result<OnboardingState, OnboardingError> {
    move_step(flow, "go back", |step| match step {
        OnboardingStep::ChooseMethod => Some(OnboardingStep::Welcome),
        OnboardingStep::VerifyOtp { .. } => Some(OnboardingStep::ChooseMethod),
        _ => None,
    })
}

pub async fn submit_phone_internal(
    flow: &SharedOnboarding,
    gateway: &dyn CivicGateway,
    limits: &ValidationLimits,
    phone: &str,
) -> Result<OnboardingState, OnboardingError> {
    let step = current_step(flow)?;
    if step != OnboardingStep::ChooseMethod {
        return Err(wrong_step("send an OTP", &step));
    }

    let digits = validate_phone(phone, limits)?;
    gateway.send_otp(&digits).await?;
    log::info!("OTP requested");

    advance_from(
        flow,
        &step,
        "send an OTP",
        OnboardingStep::VerifyOtp { phone: digits },
        None,
    )
}

pub async fn resend_otp_internal(
    flow: &SharedOnboarding,
    gateway: &dyn CivicGateway,
) -> Result<OnboardingState, OnboardingError> {
    let step = current_step(flow)?;
    let OnboardingStep::VerifyOtp { phone } = &step else {
        return Err(wrong_step("resend the OTP", &step));
    };

    gateway.send_otp(phone).await?;
    onboarding_state_internal(flow)
}

pub async fn submit_otp_internal(
    flow: &SharedOnboarding,
    gateway: &dyn CivicGateway,
    limits: &ValidationLimits,
    otp: &str,
) -> Result<OnboardingState, OnboardingError> {
    let step = current_step(flow)?;
    let OnboardingStep::VerifyOtp { phone } = &step else {
        return Err(wrong_step("verify an OTP", &step));
    };

    validate_otp(otp, limits)?;
    let session = gateway.verify_otp(phone, otp.trim()).await?;

    let state = advance_from(
        flow,
        &step,
        "verify an OTP",
        OnboardingStep::Complete,
        Some(session),
    )?;
    log::info!("signed in with phone");
    Ok(state)
}

pub async fn digilocker_internal(
    flow: &SharedOnboarding,
    gateway: &dyn CivicGateway,
) -> Result<OnboardingState, OnboardingError> {
    let step = current_step(flow)?;
    if step != OnboardingStep::ChooseMethod {
        return Err(wrong_step("continue with DigiLocker", &step));
    }

    let session = gateway.digilocker_login().await?;

    let state = advance_from(
        flow,
        &step,
        "continue with DigiLocker",
        OnboardingStep::Complete,
        Some(session),
    )?;
    log::info!("signed in with DigiLocker");
    Ok(state)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn onboarding_state(flow: tauri::State<'_, SharedOnboarding>) -> Result<OnboardingState, String> {
    onboarding_state_internal(flow.inner()).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn onboarding_get_started(
    flow: tauri::State<'_, SharedOnboarding>,
) -> Result<OnboardingState, String> {
    get_started_internal(flow.inner()).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn onboarding_back(flow: tauri::State<'_, SharedOnboarding>) -> Result<OnboardingState, String> {
    back_internal(flow.inner()).map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn onboarding_submit_phone(
    phone: String,
    flow: tauri::State<'_, SharedOnboarding>,
    gateway: tauri::State<'_, SharedGateway>,
    settings: tauri::State<'_, SharedSettings>,
) -> Result<OnboardingState, String> {
    let limits = current_limits(settings.inner())?;
    submit_phone_internal(flow.inner(), gateway.inner().as_ref(), &limits, &phone)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn onboarding_resend_otp(
    flow: tauri::State<'_, SharedOnboarding>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<OnboardingState, String> {
    resend_otp_internal(flow.inner(), gateway.inner().as_ref())
        .await
        .map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn onboarding_submit_otp(
    otp: String,
    flow: tauri::State<'_, SharedOnboarding>,
    gateway: tauri::State<'_, SharedGateway>,
    settings: tauri::State<'_, SharedSettings>,
) -> Result<OnboardingState, String> {
    let limits = current_limits(settings.inner())?;
    submit_otp_internal(flow.inner(), gateway.inner().as_ref(), &limits, &otp)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn onboarding_digilocker(
    flow: tauri::State<'_, SharedOnboarding>,
    gateway: tauri::State<'_, SharedGateway>,
) -> Result<OnboardingState, String> {
    digilocker_internal(flow.inner(), gateway.inner().as_ref())
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::gateway::{GatewayDelays, MockGateway};
    use crate::models::session::AuthMethod;
    use std::time::Duration;

    fn setup() -> (SharedOnboarding, MockGateway, ValidationLimits) {
        (
            SharedOnboarding::default(),
            MockGateway::new(GatewayDelays::ZERO).expect("gateway"),
            ValidationLimits::default(),
        )
    }

    #[tokio::test]
    async fn phone_flow_reaches_complete() {
        let (flow, gateway, limits) = setup();

        get_started_internal(&flow).expect("get started");
        let state = submit_phone_internal(&flow, &gateway, &limits, "98765-43210")
            .await
            .expect("phone accepted");
        assert_eq!(
            state.step,
            OnboardingStep::VerifyOtp {
                phone: "9876543210".to_string()
            }
        );

        resend_otp_internal(&flow, &gateway).await.expect("resend");

        let state = submit_otp_internal(&flow, &gateway, &limits, "123456")
            .await
            .expect("otp accepted");
        assert_eq!(state.step, OnboardingStep::Complete);
        let session = state.session.expect("session");
        assert_eq!(session.method, AuthMethod::Phone);
    }

    #[tokio::test]
    async fn invalid_input_keeps_the_step() {
        let (flow, gateway, limits) = setup();
        get_started_internal(&flow).expect("get started");

        let err = submit_phone_internal(&flow, &gateway, &limits, "12345")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid phone number: Please enter a valid 10-digit phone number."
        );
        assert_eq!(current_step(&flow).unwrap(), OnboardingStep::ChooseMethod);

        submit_phone_internal(&flow, &gateway, &limits, "9876543210")
            .await
            .expect("phone accepted");
        let err = submit_otp_internal(&flow, &gateway, &limits, "12")
            .await
            .unwrap_err();
        assert!(matches!(err, OnboardingError::Validation(ValidationError::InvalidOtp)));
        assert!(matches!(current_step(&flow).unwrap(), OnboardingStep::VerifyOtp { .. }));
    }

    #[tokio::test]
    async fn steps_are_enforced() {
        let (flow, gateway, limits) = setup();

        let err = submit_otp_internal(&flow, &gateway, &limits, "1234")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot verify an OTP from the welcome step");
        assert!(back_internal(&flow).is_err());

        get_started_internal(&flow).expect("get started");
        assert_eq!(
            back_internal(&flow).expect("back").step,
            OnboardingStep::Welcome
        );
    }

    #[tokio::test]
    async fn digilocker_skips_otp() {
        let (flow, gateway, _) = setup();
        get_started_internal(&flow).expect("get started");

        let state = digilocker_internal(&flow, &gateway).await.expect("digilocker");
        assert_eq!(state.step, OnboardingStep::Complete);
        assert_eq!(state.session.unwrap().method, AuthMethod::Digilocker);
        assert!(get_started_internal(&flow).is_err());
    }

    #[tokio::test]
    async fn going_back_during_a_slow_otp_request_wins() {
        let flow = SharedOnboarding::default();
        let limits = ValidationLimits::default();
        let gateway = MockGateway::new(GatewayDelays {
            network: Duration::from_millis(200),
            ..GatewayDelays::ZERO
        })
        .expect("gateway");
        get_started_internal(&flow).expect("get started");

        let (submitted, went_back) = tokio::join!(
            submit_phone_internal(&flow, &gateway, &limits, "9876543210"),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                back_internal(&flow)
            }
        );

        assert_eq!(went_back.expect("back").step, OnboardingStep::Welcome);
        assert_eq!(
            submitted.unwrap_err().to_string(),
            "Cannot send an OTP from the welcome step"
        );
        assert_eq!(current_step(&flow).unwrap(), OnboardingStep::Welcome);
    }

    #[tokio::test]
    async fn only_the_first_sign_in_method_to_finish_completes() {
        let flow = SharedOnboarding::default();
        let limits = ValidationLimits::default();
        let gateway = MockGateway::new(GatewayDelays {
            network: Duration::from_millis(200),
            location: Duration::ZERO,
            digilocker: Duration::from_millis(20),
        })
        .expect("gateway");
        get_started_internal(&flow).expect("get started");

        let (phone, digilocker) = tokio::join!(
            submit_phone_internal(&flow, &gateway, &limits, "9876543210"),
            digilocker_internal(&flow, &gateway)
        );

        assert_eq!(digilocker.expect("digilocker").step, OnboardingStep::Complete);
        assert!(matches!(phone, Err(OnboardingError::WrongStep { step: "complete", .. })));
        let state = onboarding_state_internal(&flow).unwrap();
        assert_eq!(state.session.unwrap().method, AuthMethod::Digilocker);
    }
}
