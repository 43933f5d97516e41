use super::Environment;
use anyhow::{Context, Result};
use moveground_application::OperationOutcome;
use moveground_core::session::FORMAT_FAILURE_MESSAGE;
use std::path::Path;

pub async fn run(env: &Environment, file: &Path, write: bool) -> Result<()> {
    let session = env.open_file(file).await?;
    let outcome = session.format().await;
    session.flush_persistence().await;

    if let OperationOutcome::Failed(e) = outcome {
        anyhow::bail!("{} ({})", FORMAT_FAILURE_MESSAGE, e);
    }

    let snapshot = session.snapshot();
    if write {
        std::fs::write(file, &snapshot.buffer)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        eprintln!("{}", snapshot.display_output());
    } else {
        println!("{}", snapshot.buffer);
    }
    Ok(())
}
