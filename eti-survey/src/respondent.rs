/// The seam between the experiment runners and whatever produces answers.
///
/// Production code plugs an LLM client in here; tests use scripted
/// respondents. Invocation details — API transport, retries, caching — live
/// entirely on the implementor's side.
pub trait SurveyRespondent {
    /// Produce the raw text answer to one rendered prompt.
    fn respond(&mut self, prompt: &str) -> String;
}

/// Adapter turning a closure into a respondent.
pub struct FnRespondent<F>(pub F);

impl<F> SurveyRespondent for FnRespondent<F>
where
    F: FnMut(&str) -> String,
{
    fn respond(&mut self, prompt: &str) -> String {
        (self.0)(prompt)
    }
}
