//! Prompt templates for quiz generation and answering.

use crate::model::{Question, Snippet};

/// Suffix appended to truncated source text.
const TRUNCATION_MARKER: &str = "...";

/// Slack allowed past the budget before text is cut.
const TRUNCATION_LEEWAY: usize = 5;

const QUIZ_GENERATION_TEMPLATE: &str = r#"Given the following text, create 5 multiple choice quizzes in JSON format.
Each question should have 4 different options, and only one of them should be correct.
The options should be unambiguous.
Each option should begin with a letter followed by a period and a space (e.g., "a. option").
The question should also briefly mention the general topic of the text so that it can be understood in isolation.
Each question should not give hints to answer the other questions.
Include challenging questions, which require reasoning.

respond with JSON only, no markdown or descriptions.

example JSON format you should absolutely follow:
{"topic": "a sentence explaining the topic of the text",
 "questions":
  [
    {
      "question": "text of the question",
      "options": ["a. 1st option", "b. 2nd option", "c. 3rd option", "d. 4th option"],
      "right_option": "c"
    }, ...
  ]
}
"right_option" is the letter of the right option ("a" for the first, "b" for the second, etc.).

text:
{text}
"#;

const ANSWER_INSTRUCTIONS: &str = r#"In the answer, just specify the letter corresponding to the option.
If you don't know the answer, just provide your best guess and do not provide any reasoning.

For example, if you think the answer is the first option, just write "a".
If you think the answer is the second option, just write "b", and so on."#;

/// Build the quiz generation prompt from extracted page texts.
///
/// Each text is truncated to `budget` characters independently.
pub fn quiz_generation(texts: &[String], budget: usize) -> String {
    let joined: String = texts.iter().map(|t| truncate_text(t, budget)).collect();
    QUIZ_GENERATION_TEMPLATE.replace("{text}", &joined)
}

/// Closed-book prompt: topic, question and options only.
pub fn closed_book(topic: &str, question: &Question) -> String {
    format!(
        "Answer the following question, specifying one of the options.\n\
         The topic is: {topic}.\n\n\
         {ANSWER_INSTRUCTIONS}\n\n\
         question: {}\n\
         options: {}\n\n\
         chosen option (a, b, c, or d):\n",
        question.question,
        render_options(&question.options),
    )
}

/// Web-RAG prompt: closed-book content plus the retrieved snippets.
///
/// An empty snippet list still yields a complete prompt.
pub fn web_rag(topic: &str, question: &Question, snippets: &[Snippet]) -> String {
    let mut rendered = String::new();
    for snippet in snippets {
        rendered.push_str(&format!("- snippet: \"{}\"\n", snippet.content));
    }

    format!(
        "Answer the question about \"{topic}\", using your knowledge and the snippets extracted from the web.\n\n\
         {ANSWER_INSTRUCTIONS}\n\n\
         question: {}\n\
         options: {}\n\n\
         Snippets:\n\
         {rendered}\n\
         chosen option (a, b, c, or d):\n",
        question.question,
        render_options(&question.options),
    )
}

/// Render options as a bracketed list of quoted labels.
fn render_options(options: &[String]) -> String {
    let quoted: Vec<String> = options.iter().map(|o| format!("'{o}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Truncate `text` to roughly `budget` characters on a word boundary.
///
/// Texts no longer than `budget + 5` characters are returned unchanged.
/// Longer texts are cut to `budget - 3` characters, backed off to the last
/// whitespace, and suffixed with `"..."`.
pub fn truncate_text(text: &str, budget: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= budget + TRUNCATION_LEEWAY {
        return text.to_string();
    }

    let keep = budget.saturating_sub(TRUNCATION_MARKER.len());
    let head: String = text.chars().take(keep).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) => head[..pos].trim_end(),
        None => head.as_str(),
    };
    format!("{cut}{TRUNCATION_MARKER}")
}
