use tracing::info;

use crate::brain::Brain;
use crate::dom;
use crate::error::AnalyzeError;
use crate::hands::Hands;
use crate::recovery;
use crate::types::{Analysis, InteractiveElement};

/// Fetch a page and return its interactive-element inventory.
pub async fn inventory(hands: &Hands, url: &str) -> Result<Vec<InteractiveElement>, AnalyzeError> {
    let body = hands.fetch(url).await?;
    let elements = dom::extract_from_markup(&body)?;
    info!("Extracted {} interactive elements from {}", elements.len(), url);
    Ok(elements)
}

/// Full run: fetch, extract, ask the model, recover its answer.
///
/// Fetch, extraction and generation failures are reported as one error.
/// An unrecoverable model reply is not an error; it yields no recommendations.
pub async fn analyze(
    hands: &Hands,
    brain: &Brain,
    url: &str,
    use_flash: bool,
) -> Result<Analysis, AnalyzeError> {
    let elements = inventory(hands, url).await?;
    let raw = brain.recommend(&elements, use_flash).await?;
    let recommendations = recovery::recover_recommendations(&raw);
    info!("Recovered {} recommendations for {}", recommendations.len(), url);

    Ok(Analysis {
        url: url.to_string(),
        elements,
        recommendations,
    })
}
