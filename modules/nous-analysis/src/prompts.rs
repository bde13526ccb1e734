//! Strict JSON-only prompt builders.
//!
//! Every prompt forces the instruct model to answer with exactly one JSON
//! object so the structured-output runner can parse it. Tuned for
//! imperfect open-weights instruction models; the wording is not part of
//! any contract.

pub fn sentiment_prompt(text: &str) -> String {
    format!(
        "[INST]\n\
         You are a sentiment analysis system.\n\n\
         Analyze the provided text and return EXACTLY ONE JSON OBJECT with this structure:\n\n\
         {{\n\
         \x20 \"sentiment\": \"positive\" | \"negative\" | \"neutral\",\n\
         \x20 \"confidence\": number,\n\
         \x20 \"explanation\": string\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\
         - \"confidence\" MUST be between 0 and 1.\n\
         - If sentiment is mixed or unclear, choose \"neutral\".\n\n\
         Text to analyze:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim()
    )
}

pub fn political_bias_prompt(text: &str) -> String {
    format!(
        "[INST]\n\
         You are a political bias classification system.\n\n\
         Analyze the text and return EXACTLY ONE JSON OBJECT:\n\n\
         {{\n\
         \x20 \"bias\": \"left\" | \"center\" | \"right\"\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\
         - The value MUST be lowercase.\n\
         - If the bias is unclear or mixed, choose the most likely label.\n\n\
         Text to analyze:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim()
    )
}

pub fn cognitive_bias_prompt(text: &str) -> String {
    format!(
        "[INST]\n\
         You are a cognitive bias detection system.\n\n\
         Identify cognitive biases in the text and return EXACTLY ONE JSON OBJECT:\n\n\
         {{\n\
         \x20 \"biases\": [\n\
         \x20   {{\n\
         \x20     \"bias\": string,\n\
         \x20     \"snippet\": string,\n\
         \x20     \"explanation\": string,\n\
         \x20     \"severity\": \"low\" | \"medium\" | \"high\",\n\
         \x20     \"category\": string\n\
         \x20   }}\n\
         \x20 ]\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\
         - \"biases\" MUST be an array; return an empty array if none are found.\n\
         - Every entry MUST include at least the \"bias\" field.\n\n\
         Text to analyze:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim()
    )
}

pub fn antithesis_prompt(text: &str) -> String {
    format!(
        "[INST]\n\
         You are a counter-narrative system.\n\n\
         Write a concise synthesis of the strongest opposing viewpoint to the\n\
         article's main thrust and return EXACTLY ONE JSON OBJECT:\n\n\
         {{\n\
         \x20 \"antithesis\": string\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\
         - The antithesis MUST be at least one full sentence.\n\n\
         Article:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim()
    )
}

pub fn philosophical_prompt(text: &str) -> String {
    format!(
        "[INST]\n\
         You are a philosophical analysis system.\n\n\
         Produce a structured philosophical interpretation of the article and\n\
         return EXACTLY ONE JSON OBJECT with these fields:\n\n\
         {{\n\
         \x20 \"philosophical_summary\": string,\n\
         \x20 \"themes\": [string],\n\
         \x20 \"worldview\": string,\n\
         \x20 \"ethical_questions\": [string],\n\
         \x20 \"traditions\": [string],\n\
         \x20 \"explanation\": string\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\n\
         Article:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim()
    )
}

pub fn summarization_prompt(text: &str) -> String {
    format!(
        "[INST]\n\
         You are a news summarization system.\n\n\
         Summarize the article in 2-3 sentences and return EXACTLY ONE JSON OBJECT:\n\n\
         {{\n\
         \x20 \"summary\": string\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\
         - The summary MUST be non-empty.\n\n\
         Article:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim()
    )
}

pub fn translation_prompt(text: &str, target_language: &str) -> String {
    format!(
        "[INST]\n\
         You are a translation system.\n\n\
         Translate the text into the language with ISO 639-1 code \"{target}\"\n\
         and return EXACTLY ONE JSON OBJECT:\n\n\
         {{\n\
         \x20 \"translation\": string\n\
         }}\n\n\
         STRICT RULES:\n\
         - Output MUST be valid JSON and nothing else.\n\
         - Preserve meaning and tone; do not add commentary.\n\n\
         Text:\n\
         \"\"\"\n{}\n\"\"\"\n\n\
         Return ONLY the JSON object now.\n\
         [/INST]",
        text.trim(),
        target = target_language,
    )
}
