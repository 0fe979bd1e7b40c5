pub const QUESTION_GENERATOR_PREAMBLE: &str = "You are an expert educator who creates high-quality study questions.
Generate study questions from random sections of the following text.";

pub const QUESTION_FORMAT_RULES: &str = "IMPORTANT:
1. Questions should cover different parts of the text, not just the beginning.
2. For each question, provide an answer and a detailed explanation.
3. Return ONLY a valid JSON object with an array of questions, each with id, text, answer, explanation, and type fields.
4. Each question must have a unique numeric id field starting from 1.
5. If type is \"objective\", there should be options that correspond to the answer.

Example format:
{
  \"questions\": [
    {
      \"id\": 1,
      \"text\": \"What is...?\",
      \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\", \"Option E\"],
      \"answer\": \"The answer is...\",
      \"explanation\": \"Detailed explanation...\",
      \"type\": \"objective\"
    }
  ]
}";

pub const CONTEXT_SECTION_HEADER: &str =
    "Here are random sections from the text to help generate diverse questions:";

pub const CONTEXT_WINDOW_SEPARATOR: &str = "\n\n---\n\n";
