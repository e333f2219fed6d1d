// SPDX-License-Identifier: MIT
// Copyright 2026 The Course Forge Authors

//! Prompt templates for each generation feature.

use crate::models::course::CourseModule;

/// Cut text to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Ask for `module_count` modules structured from `source`.
pub fn course_structure(course_name: &str, source: &str, module_count: u32) -> String {
    format!(
        "You are an instructional designer. Organize the source material below into a course \
named \"{course_name}\" with exactly {module_count} modules, in teaching order.\n\
For each module provide a short \"title\", a \"concept\" section explaining the idea in \
clear prose, and an \"example\" section with a concrete example or everyday analogy.\n\
Respond with JSON only, in this shape:\n\
{{\"modules\": [{{\"title\": \"...\", \"concept\": \"...\", \"example\": \"...\"}}]}}\n\n\
Source material:\n{source}"
    )
}

/// Ask for `count` four-option questions about a module.
pub fn quiz(module: &CourseModule, count: u32) -> String {
    format!(
        "Write {count} multiple-choice questions testing the module below.\n\
Each question has exactly 4 options and exactly one correct option. Label each question \
with the Bloom's taxonomy level it targets: \"Remember\", \"Understand\" or \"Analyze\". \
Mix the levels.\n\
Respond with JSON only, in this shape:\n\
{{\"questions\": [{{\"question\": \"...\", \"bloom_level\": \"Remember\", \
\"options\": [{{\"text\": \"...\", \"correct\": true}}, {{\"text\": \"...\", \"correct\": false}}, \
{{\"text\": \"...\", \"correct\": false}}, {{\"text\": \"...\", \"correct\": false}}]}}]}}\n\n\
Module title: {}\n\
Concept:\n{}\n\
Example:\n{}",
        module.title, module.concept, module.example
    )
}

/// Ask for a judgement of a free-text answer.
pub fn answer_validation(question: &str, answer: &str, context: Option<&str>) -> String {
    let context = context
        .map(|c| format!("Reference material:\n{c}\n\n"))
        .unwrap_or_default();
    format!(
        "{context}Decide whether the learner's answer to the question is correct. Be lenient \
about wording but strict about meaning.\n\
Respond with JSON only: {{\"correct\": true or false, \"feedback\": \"one or two sentences\"}}\n\n\
Question: {question}\n\
Learner's answer: {answer}"
    )
}

/// Ask for a rewrite of `text` following `instruction`.
pub fn writing_assist(instruction: &str, text: &str) -> String {
    format!(
        "Rewrite the text below following this instruction: {instruction}\n\
Return only the rewritten text, without commentary.\n\n\
Text:\n{text}"
    )
}
