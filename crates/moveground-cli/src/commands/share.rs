use super::Environment;
use anyhow::Result;
use moveground_core::session::ShareState;
use std::path::Path;

pub async fn run(env: &Environment, file: &Path) -> Result<()> {
    let session = env.open_file(file).await?;
    session.share().await;
    session.flush_persistence().await;

    match session.snapshot().share {
        ShareState::Ready(links) => {
            println!("Share id:   {}", links.id);
            println!("Playground: {}", links.playground_url);
            println!("Gist:       {}", links.gist_url);
            Ok(())
        }
        state => anyhow::bail!("Share did not complete: {:?}", state),
    }
}
