//! Explain a match with a scripted embedder and print the narrative.

use std::sync::Arc;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    use roomlens::{ExplainableMatcher, HeuristicDecomposer, HeuristicKind, MockEmbedder};

    let prompt = "scandinavian kitchen with a large island, white oak countertops and pendant lighting";
    let embedder = MockEmbedder::new()
        .with_similarity(prompt, 0.38)
        .with_similarity("scandinavian kitchen", 0.51)
        .with_similarity("large island", 0.29)
        .with_similarity("white oak countertops", 0.33)
        .with_similarity("pendant lighting", 0.08);

    let matcher = ExplainableMatcher::new(
        Arc::new(embedder),
        Arc::new(HeuristicDecomposer::new(HeuristicKind::Pattern)?),
    );

    let result = matcher.explain(vec![0xFF; 16], prompt).await?;
    println!("{}", result.explanation_text);
    println!("{}", serde_json::to_string_pretty(&result.feature_breakdown)?);
    Ok(())
}
