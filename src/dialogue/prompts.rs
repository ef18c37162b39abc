use crate::providers::ChatPrompt;

/// Render a speaker token for prose: `JOE_ROGAN` -> `JOE ROGAN`
pub fn display_name(speaker_id: &str) -> String {
    speaker_id.replace('_', " ")
}

/// Prompt asking the generative service for a two-speaker script
pub fn dialogue_prompt(topic: &str, speaker_a: &str, speaker_b: &str, max_exchanges: u32) -> ChatPrompt {
    let name_a = display_name(speaker_a);
    let name_b = display_name(speaker_b);

    let system = format!(
        "Create a dialogue for a short-form conversation on the topic of {topic}. \
         The conversation is between two agents, {name_a} and {name_b}, who act as exaggerated, \
         over-the-top caricatures of themselves with amplified personality traits and mannerisms. \
         The dialogue should still give real insight into {topic}. \
         Limit the dialogue to a maximum of {max_exchanges} exchanges, aiming for a concise transcript \
         that would last about one minute. \
         The agentId attribute must be exactly {speaker_a} or {speaker_b}. \
         The text attribute is that character's line of dialogue. \
         Respond with JSON in exactly this shape: \
         {{ \"transcript\": [ {{\"agentId\": \"{speaker_a} or {speaker_b}\", \"text\": \"their line\"}} ] }}"
    );

    let user = format!(
        "Generate a video about {topic}. Both agents should talk about it the way they would, \
         with their qualities pushed to the extreme so the conversation is entertaining to watch."
    );

    ChatPrompt::new(system).with_user(user).json()
}

/// Prompt asking the generative service to correct a subtitle block against its script line
pub fn repair_prompt(canonical_text: &str, noisy_block: &str) -> ChatPrompt {
    let system = format!(
        "The first item is the correct text, the second is an SRT block generated from it by speech \
         recognition and may be inaccurate. Words can be misspelled or missing; restore them from the \
         correct text. Return the corrected SRT. Keep the format, the cue count and every timestamp exactly \
         the same.\n\ntranscript:\n{canonical_text}\n\nsrt file text:\n{noisy_block}"
    );

    ChatPrompt::new(system)
}
