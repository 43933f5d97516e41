use super::Environment;
use anyhow::Result;
use moveground_application::ImportOutcome;
use moveground_core::location::PageLocation;

/// Resolves the code a playground URL refers to and prints it.
///
/// The imported code becomes the stored buffer, as opening the URL in the
/// editor would.
pub async fn run(env: &Environment, url: &str) -> Result<()> {
    let location = PageLocation::parse(url)?;
    let session = env.session_factory().create_session(None).await;
    let mut notices = session.subscribe_notices();

    let outcome = session.mount(&location).outcome().await;
    session.flush_persistence().await;

    match outcome {
        ImportOutcome::Applied(_) => {
            println!("{}", session.snapshot().buffer);
            Ok(())
        }
        ImportOutcome::NotFound { share_id } => {
            let message = notices
                .try_recv()
                .map(|notice| notice.message())
                .unwrap_or_else(|_| "Import failed".to_string());
            anyhow::bail!("{} (share_id={})", message, share_id)
        }
        ImportOutcome::NoReference => {
            anyhow::bail!("URL carries neither a share_id nor a code fragment: {}", url)
        }
        other => anyhow::bail!("Import did not complete: {:?}", other),
    }
}
