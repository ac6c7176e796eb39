use face_compare_lib::compare::{FaceCompareClient, FaceCompareClientTrait, HyperTransport};
use face_compare_lib::{config, credentials, logging};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "usage: face-compare <settings-dir> <first-image> <second-image>";

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logger();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 3 {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    }

    match run(&args[0], &args[1], &args[2]).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Face compare failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings_dir: &str, first: &str, second: &str) -> Result<String, String> {
    let settings = config::load(&PathBuf::from(settings_dir))?;
    if settings.access_key_id.is_empty() {
        return Err(format!(
            "access_key_id is not set. Edit face_compare_config.json in {settings_dir}"
        ));
    }
    let secret = credentials::load_access_key_secret(&settings.access_key_id)?;

    let first = std::fs::read(first).map_err(|e| format!("Failed to read first image: {e}"))?;
    let second = std::fs::read(second).map_err(|e| format!("Failed to read second image: {e}"))?;

    let mut transport = HyperTransport::new().map_err(|e| e.to_string())?;
    if let Some(timeout) = settings.request_timeout() {
        transport = transport.with_timeout(timeout);
    }

    let client =
        FaceCompareClient::with_transport(settings.into_client_config(secret), Arc::new(transport))
            .map_err(|e| e.to_string())?;

    let result = client
        .compare(&first, &second)
        .await
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&result).map_err(|e| format!("Failed to serialize result: {e}"))
}
