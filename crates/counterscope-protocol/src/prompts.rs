//! Prompt templates
//!
//! The backend is always instructed to lead its answer with the label
//! so the lenient prefix parse in `counterscope-backend` applies.

/// Category definitions shared by every prompt
pub const SYSTEM_PROMPT: &str = "\
Assume you are a bot that helps reduce hate on the internet. Your job is to \
decide whether a speech is hate speech, counter hate speech to another speech, \
or neutral speech, based on these definitions:
* Hate: content that insults, expresses, incites, or promotes hate, violence \
or serious harm based on race, gender, ethnicity, religion, nationality, \
sexual orientation, disability status, or caste.
* Counter-hate: content responding to hate speech with empathy, challenging \
the hate narratives or asking for clarification, rather than answering with \
more hate in the opposite direction.
* Neutral: speech that is neither hate speech nor counter hate speech.";

/// Ask whether a single speech is hate or neutral, with no reference
/// to any other speech
pub fn root_prompt(speech: &str) -> String {
    format!(
        "Is this speech '{speech}' a hate speech or a neutral speech based on \
the mentioned definitions?\n\
Reply in the format: (your evaluation), because (your explanation). Your \
evaluation must be exactly one of: hate speech, neutral speech. Keep the \
explanation to 1-2 sentences."
    )
}

/// Ask whether a reply is hate, counter-hate, or neutral relative to
/// an established hate-speech parent
pub fn conditioned_reply_prompt(reply: &str, parent: &str) -> String {
    format!(
        "The previous speech '{parent}' was classified as hate speech. Is this \
reply '{reply}' a hate speech, a counter hate speech to that hate speech, or \
a neutral speech based on the mentioned definitions?\n\
Reply in the format: (your evaluation), because (your explanation). Your \
evaluation must be exactly one of: counter hate speech, hate speech, neutral \
speech. Keep the explanation to 1-2 sentences."
    )
}

/// Self-contained prompt carrying both texts, answered in the
/// `Parent speech is .., Counter speech is .., because ..` format
pub fn pair_prompt(parent: &str, reply: &str) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\n\
Parent speech: {parent}\n\
Counter speech: {reply}\n\n\
First decide whether the parent speech is hate speech or neutral speech, then \
decide whether the counter speech is hate speech, counter hate speech, or \
neutral speech.\n\
Reply in the format: Parent speech is (your evaluation), Counter speech is \
(your evaluation), because (your explanation)."
    )
}
