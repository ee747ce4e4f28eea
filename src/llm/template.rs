//! Prompt templates with `{name}` placeholders
//!
//! `{{` and `}}` produce literal braces. Formatting checks the supplied
//! variables against the declared ones, so a missing or extra variable is
//! reported when the template is used rather than when it is built.

use crate::config::PromptConfig;
use crate::{ChatError, Result};
use std::collections::{BTreeSet, HashMap};

/// Variable the dispatcher binds the user's message to
pub const QUESTION_VARIABLE: &str = "question";

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed, reusable prompt template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    input_variables: Vec<String>,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Build a template from its configuration section
    pub fn from_config(config: &PromptConfig) -> Result<Self> {
        Self::new(config.template.clone(), config.input_variables.clone())
    }

    pub fn new(template: impl Into<String>, input_variables: Vec<String>) -> Result<Self> {
        let source = template.into();
        let segments = parse(&source)?;
        Ok(Self {
            source,
            input_variables,
            segments,
        })
    }

    pub fn template(&self) -> &str {
        &self.source
    }

    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Placeholder names referenced by the template text
    pub fn placeholders(&self) -> BTreeSet<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute the given variables into the template
    pub fn format(&self, vars: &HashMap<&str, &str>) -> Result<String> {
        let declared: BTreeSet<&str> = self.input_variables.iter().map(String::as_str).collect();

        let missing: Vec<&str> = declared
            .iter()
            .copied()
            .filter(|name| !vars.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(ChatError::Template(format!(
                "missing value for input variable(s): {}",
                missing.join(", ")
            )));
        }

        let mut extra: Vec<&str> = vars
            .keys()
            .copied()
            .filter(|name| !declared.contains(name))
            .collect();
        if !extra.is_empty() {
            extra.sort_unstable();
            return Err(ChatError::Template(format!(
                "unexpected input variable(s): {}",
                extra.join(", ")
            )));
        }

        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder(name) => match vars.get(name.as_str()) {
                    Some(value) => output.push_str(value),
                    None => {
                        return Err(ChatError::Template(format!(
                            "placeholder '{{{}}}' is not a declared input variable",
                            name
                        )))
                    }
                },
            }
        }

        Ok(output)
    }

    /// Format with the user's message bound to `question`
    pub fn format_question(&self, question: &str) -> Result<String> {
        let vars = HashMap::from([(QUESTION_VARIABLE, question)]);
        self.format(&vars)
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(ChatError::Template(format!(
                                "unterminated placeholder in template near '{{{}'",
                                name
                            )))
                        }
                        Some(ch) => name.push(ch),
                    }
                }
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ChatError::Template("empty placeholder '{}' in template".into()));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
            '}' => {
                return Err(ChatError::Template(
                    "single '}' in template; use '}}' for a literal brace".into(),
                ))
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_template(text: &str) -> PromptTemplate {
        PromptTemplate::new(text, vec!["question".to_string()]).unwrap()
    }

    #[test]
    fn test_format_question() {
        let template = question_template("You are terse.\nQuestion: {question}\nAnswer:");
        assert_eq!(
            template.format_question("Why is the sky blue?").unwrap(),
            "You are terse.\nQuestion: Why is the sky blue?\nAnswer:"
        );
    }

    #[test]
    fn test_repeated_placeholder() {
        let template = question_template("{question} / {question}");
        assert_eq!(template.format_question("x").unwrap(), "x / x");
    }

    #[test]
    fn test_escaped_braces() {
        let template = question_template("Reply as JSON {{\"answer\": ...}} to {question}");
        assert_eq!(
            template.format_question("hi").unwrap(),
            "Reply as JSON {\"answer\": ...} to hi"
        );
        assert_eq!(template.placeholders().into_iter().collect::<Vec<_>>(), vec!["question"]);
    }

    #[test]
    fn test_missing_variable_fails_at_format_time() {
        let template =
            PromptTemplate::new("{context} {question}", vec!["context".into(), "question".into()])
                .unwrap();
        let err = template.format_question("hi").unwrap_err();
        assert!(err.to_string().contains("context"));
    }

    #[test]
    fn test_extra_variable_fails() {
        let template = question_template("{question}");
        let vars = HashMap::from([("question", "a"), ("tone", "b")]);
        let err = template.format(&vars).unwrap_err();
        assert!(err.to_string().contains("tone"));
    }

    #[test]
    fn test_undeclared_placeholder_fails() {
        let template = question_template("{question} in {language}");
        assert!(matches!(
            template.format_question("hi"),
            Err(ChatError::Template(_))
        ));
    }

    #[test]
    fn test_wrong_variable_name_for_dispatcher() {
        let template = PromptTemplate::new("Q: {query}", vec!["query".into()]).unwrap();
        assert!(template.format_question("hi").is_err());
    }

    #[test]
    fn test_malformed_templates() {
        assert!(PromptTemplate::new("{question", vec![]).is_err());
        assert!(PromptTemplate::new("oops }", vec![]).is_err());
        assert!(PromptTemplate::new("{}", vec![]).is_err());
    }
}
