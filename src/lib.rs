pub mod commands;
pub mod interaction;
pub mod models;

#[cfg(feature = "desktop")]
use commands::{
    gateway::MockGateway,
    onboarding::{
        onboarding_back, onboarding_digilocker, onboarding_get_started, onboarding_resend_otp,
        onboarding_state, onboarding_submit_otp, onboarding_submit_phone, SharedOnboarding,
    },
    reports::{
        cast_vote, get_report_detail, get_status_counts, list_my_reports, list_reports,
        reload_reports, SharedBoard, SharedGateway,
    },
    settings::{get_settings, load_effective_settings, save_settings, EffectiveSettings, SharedSettings},
    submission::{detect_location, remove_image_at, submit_report, validate_images},
};
#[cfg(feature = "desktop")]
use std::sync::{Arc, Mutex};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use tauri::Manager;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(SharedBoard::default())
        .manage(SharedOnboarding::default())
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            let effective = load_effective_settings(&data_dir.to_string_lossy()).unwrap_or_else(|e| {
                log::warn!("falling back to default settings: {e}");
                EffectiveSettings::default()
            });

            let gateway: SharedGateway = Arc::new(MockGateway::new(effective.delays)?);
            let settings: SharedSettings = Arc::new(Mutex::new(effective));
            app.manage(gateway);
            app.manage(settings);

            log::info!("civic reports ready, data dir {}", data_dir.display());
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            reload_reports,
            list_reports,
            list_my_reports,
            get_status_counts,
            get_report_detail,
            cast_vote,
            detect_location,
            validate_images,
            remove_image_at,
            submit_report,
            onboarding_state,
            onboarding_get_started,
            onboarding_back,
            onboarding_submit_phone,
            onboarding_resend_otp,
            onboarding_submit_otp,
            onboarding_digilocker,
            get_settings,
            save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
