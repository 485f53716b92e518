// Prompt templates and builders for the three loop phases
//
// All sentinel text ("None", "N/A", empty suggestions) lives here. Callers
// pass real state and get a finished prompt; they never see placeholders.

use super::types::Critique;

const EXPLAINER_PROMPT: &str = r#"
You are a "Master Mentor" whose gift is making complex ideas feel like common sense.

Your goal: Explain the concept below to a complete beginner.

WRITE IN THIS STYLE:
- Use a warm, conversational, and encouraging tone.
- Start with a "Big Picture" hook that relates to something they already know.
- Use ONE primary, powerful analogy and stick with it.
- Avoid "Wall of Tables" or overly clinical documentation styles.
- Break ideas into short, punchy paragraphs.
- If you use a technical term, explain it immediately in parentheses or within the flow.

Concept: {concept}
Previous Explanation (if any): {previous_explanation}
Feedback from Critic (if any): {feedback}

Avoid sounding like a textbook. Sound like a smart friend explaining it over coffee.
"#;

const CRITIC_PROMPT: &str = r#"
You are a "Brutal Complexity Critic". Your only job is to find anything that would make a beginner's eyes glaze over.

Check for:
1. "Robotic" or "Dry" writing style.
2. Over-structuring (too many tables, lists, or headers that break the flow).
3. Undefined jargon.
4. Weak or missing analogies.
5. Sentences that are too long or academic.

Explanation to evaluate: {explanation}

You MUST respond in JSON format:
- score: (0-10, where 10 is perfect clarity and flow)
- issues: (List specific phrases or sections that are too complex or dry)
- suggestions: (Specific tips to make it more "human" and simple)
"#;

const REFINER_PROMPT: &str = r#"
You are a "World-Class Editor". Your job is to take the original explanation and the Critic's feedback to create a masterpiece of simple communication.

Concept: {concept}
Original Explanation: {explanation}
Critic's Score: {score}
Issues Identified: {issues}
Suggestions: {suggestions}

Your goal is to reach a score of 10/10.
Address every issue. Strip away the jargon. Smooth out the "dry" parts. Make the analogy even more relatable.
Ensure the final result feels like a cohesive story, not a list of facts.
"#;

/// Prompt for the first explanation of a fresh run.
///
/// An initial explanation has no prior context by definition, so the
/// previous-explanation and feedback slots carry the literal "None".
pub fn explain_prompt(concept: &str) -> String {
    EXPLAINER_PROMPT
        .replace("{concept}", concept)
        .replace("{previous_explanation}", "None")
        .replace("{feedback}", "None")
}

/// Prompt asking the critic to score an explanation.
pub fn critique_prompt(explanation: &str) -> String {
    CRITIC_PROMPT.replace("{explanation}", explanation)
}

/// Prompt for a refinement pass.
///
/// With no critique yet (iteration 1 of a follow-up run) the score and
/// issues slots fall back to "N/A". A `user_request`, when present, takes
/// over the suggestions slot as `USER REQUEST: {text}`; otherwise the slot
/// carries the critique suggestions comma-joined, or nothing at all.
pub fn refine_prompt(
    concept: &str,
    explanation: &str,
    critique: Option<&Critique>,
    user_request: Option<&str>,
) -> String {
    let score = critique.map_or_else(|| "N/A".to_string(), |c| c.score.to_string());
    let issues = critique.map_or_else(|| "N/A".to_string(), |c| c.issues.join(", "));
    let suggestions = match user_request {
        Some(text) => format!("USER REQUEST: {text}"),
        None => critique.map_or_else(String::new, |c| c.suggestions.join(", ")),
    };

    REFINER_PROMPT
        .replace("{concept}", concept)
        .replace("{explanation}", explanation)
        .replace("{score}", &score)
        .replace("{issues}", &issues)
        .replace("{suggestions}", &suggestions)
}
