//! Prompt assembly for the remote chat flow.

use log::warn;
use minijinja::{Environment, context};
use std::sync::LazyLock;

const REMOTE_PROMPT: &str = "{% if context %}{{ context }}\nUser: {% endif %}{{ message }}";

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.add_template("remote_prompt", REMOTE_PROMPT)
        .expect("remote prompt template should parse");
    env
});

/// Prepends the session context to a new user message.
///
/// Without context the message is sent as-is.
pub fn remote_prompt(context: &str, message: &str) -> String {
    let rendered = TEMPLATES
        .get_template("remote_prompt")
        .and_then(|template| template.render(context! { context => context, message => message }));

    match rendered {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("remote prompt template failed, sending message only: {e}");
            message.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_prompt_without_context() {
        assert_eq!(remote_prompt("", "hello"), "hello");
    }

    #[test]
    fn test_remote_prompt_with_context() {
        assert_eq!(
            remote_prompt("User: hi\nKouri: hey", "how are you?"),
            "User: hi\nKouri: hey\nUser: how are you?"
        );
    }

    #[test]
    fn test_remote_prompt_keeps_template_syntax_literal() {
        assert_eq!(remote_prompt("", "{{ 1 + 1 }} <b>"), "{{ 1 + 1 }} <b>");
    }
}
