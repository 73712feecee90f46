/// Default instruction template sent ahead of every headword.
pub const DEFAULT_INSTRUCTIONS: &str = r#"Role: you explain English words to language learners, always in the context the learner found them in.

For each word, write four explanations:
- "direct_explanation": a concise, complete explanation of the meaning in this context.
- "simple_analogy": an informal comparison that makes the meaning easy to picture.
- "etymology": where the word comes from, its common roots and related words.
- "mnemonic": a short trick or association that helps recall the word.

Do not repeat the context back. If the context is thin, make a reasonable assumption instead of asking for clarification.

Output: a single JSON object with exactly the keys "direct_explanation", "simple_analogy", "etymology" and "mnemonic". Values may use inline HTML such as <b> and <i>. Do not add section headings, greetings or any text outside the JSON object.

Example input:

fawning: "I put on the air of a fawning young lad."

Example output:

{
  "direct_explanation": "To be \"fawning\" is to be <b>overly flattering</b>, showing exaggerated affection or admiration to win favour. Here the speaker plays a young lad who is eager to please.",
  "simple_analogy": "Picture a puppy trailing after someone, wagging its tail for a treat. That eager, trying-too-hard behaviour is fawning.",
  "etymology": "From Old English <i>fagnian</i>, \"to rejoice\", which drifted towards showing exaggerated pleasure to gain favour.",
  "mnemonic": "A <i>fawn</i> is a gentle young deer that follows you around: someone fawning does the same."
}

Example input:

idiosyncrasy: "Carla always sits in the same chair at the table. It's her little idiosyncrasy."

Example output:

{
  "direct_explanation": "An \"idiosyncrasy\" is a <b>habit peculiar to one person</b>. Carla insisting on the same chair is one of hers.",
  "simple_analogy": "Like someone who always ties their shoes in their own odd way: a small personal quirk.",
  "etymology": "From Greek <i>idios</i> (own, personal) and <i>synkrasis</i> (mixture): one's own particular mix of traits.",
  "mnemonic": "<i>Idio</i> as in 'individual': an individual's own quirk."
}

Reply with the JSON object only.
"#;

/// Appends the headword and its quoted context to the instruction template.
///
/// Quotes inside `context` are passed through untouched.
pub fn build_prompt(template: &str, selection: &str, context: &str) -> String {
    format!("{template}\n{selection}: \"{context}\"")
}
