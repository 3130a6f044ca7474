use tutorbot_sessions::BindingRecord;

/// Decides whether a bound identity may ask `text`.
pub trait AccessPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn permits(&self, binding: &BindingRecord, text: &str) -> bool;
}

/// The message must literally contain the bound student's name or id.
///
/// This is a substring heuristic, not a semantic check: a message that
/// mentions the name in passing passes, and a pronoun-only follow-up
/// ("他最近還好嗎") is refused. An empty id never matches, so a binding with
/// no id is only reachable through the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionsBoundSubject;

impl AccessPolicy for MentionsBoundSubject {
    fn name(&self) -> &'static str {
        "mentions-bound-subject"
    }

    fn permits(&self, binding: &BindingRecord, text: &str) -> bool {
        let mentions = |needle: &str| !needle.is_empty() && text.contains(needle);
        mentions(&binding.name) || mentions(&binding.id)
    }
}
