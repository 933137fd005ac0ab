use warden::utils::errors::WardenError;

///
/// Main entry point for the app - the real wiring lives in the library so the
/// integration tests can drive it too.
///
#[tokio::main]
async fn main() -> Result<(), WardenError> {
    warden::lib_main().await
}
