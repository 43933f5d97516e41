use super::Environment;
use anyhow::Result;
use moveground_application::OperationOutcome;
use std::path::Path;

pub async fn run(env: &Environment, file: &Path, test: bool) -> Result<()> {
    let session = env.open_file(file).await?;
    let outcome = session.build(test).await;
    session.flush_persistence().await;

    if let OperationOutcome::Failed(e) = outcome {
        anyhow::bail!("Build failed: {}", e);
    }

    println!("{}", session.snapshot().display_output().trim_end());
    Ok(())
}
