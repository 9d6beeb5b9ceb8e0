//! Prompt construction for species verification.

use crate::sample::ReferenceSample;

/// Build the verification prompt for a reference.
///
/// Images are sent before the prompt text: the reference image first (when
/// the reference has one), then the candidate. The wording refers to them by
/// that position.
pub fn build_prompt(reference: &ReferenceSample) -> String {
    let species = &reference.scientific_name;
    let mut materials = Vec::new();
    let mut criteria = Vec::new();

    if reference.image.is_some() {
        materials.push(format!(
            "**Reference Image:** The first image provided shows the key features \
             of a confirmed *{species}*."
        ));
        criteria.push("the Reference Image (head morphology, scale patterns, eye characteristics)");
    }
    if let Some(description) = &reference.description {
        materials.push(format!("**Key Text Description:** \"{description}\""));
        criteria.push("the Key Text Description (body pattern characteristics)");
    }

    let materials = materials
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}. {m}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let candidate_position = if reference.image.is_some() {
        "second"
    } else {
        "only"
    };

    format!(
        "You are an expert herpetologist performing species verification.\n\
         \n\
         The target species is *{species}*.\n\
         \n\
         --- REFERENCE MATERIALS ---\n\
         \n\
         {materials}\n\
         \n\
         --- TASK ---\n\
         \n\
         The {candidate_position} image provided is the **Candidate Image** for identification.\n\
         \n\
         1. **Compare** the Candidate Image against {criteria}.\n\
         2. **Determine** if the Candidate Image is a **MATCH** or **NO MATCH** for *{species}*.\n\
         3. **Provide a concise explanation** detailing the matching and non-matching features \
         you observed in both the head and body (if visible).\n\
         \n\
         Format your response as a simple verdict followed by a brief justification.\n",
        criteria = criteria.join(" AND "),
    )
}
