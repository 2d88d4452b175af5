use crate::{
    error,
    management::{FileTokenStore, SearchOrchestrator},
    spotify::ApiClient,
    success, warning,
};

use super::spinner;

/// Lists the genres accepted by `search --genre`.
pub async fn genres() {
    let orchestrator =
        SearchOrchestrator::new(ApiClient::from_env(), FileTokenStore::default_location());

    let pb = spinner("Fetching genre seeds...");
    let result = orchestrator.initialize(None).await;
    pb.finish_and_clear();

    if let Err(e) = result {
        error!("{}", e);
    }

    let seeds = orchestrator.genre_seeds();
    if seeds.is_empty() {
        warning!("The catalog returned no genre seeds.");
        return;
    }

    for row in seeds.chunks(5) {
        let line: Vec<String> = row.iter().map(|genre| format!("{:<22}", genre)).collect();
        println!("  {}", line.concat().trim_end());
    }
    println!();
    success!("{} genres available", seeds.len());
}
